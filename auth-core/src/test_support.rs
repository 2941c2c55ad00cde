//! Test utilities for the auth core crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). Only
//! compiled for tests or with the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{HashingParams, PasswordHasher};

/// Clock whose instant only moves when a test advances it.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Start the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Start the clock at 2024-01-01T00:00:00Z, shared behind an `Arc`.
    pub fn shared() -> Arc<Self> {
        let start = match Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single() {
            Some(instant) => instant,
            None => panic!("fixed start instant must be unambiguous"),
        };
        Arc::new(Self::new(start))
    }

    /// Move the clock forward by `seconds`.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Argon2id hasher with the cheapest parameters Argon2 accepts.
///
/// Keeps suites fast; production code must use [`HashingParams::default`] or
/// stronger.
pub fn fast_hasher() -> PasswordHasher {
    match PasswordHasher::new(HashingParams {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    }) {
        Ok(hasher) => hasher,
        Err(error) => panic!("test hashing parameters must be valid: {error}"),
    }
}
