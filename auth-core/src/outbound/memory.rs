//! In-memory credential store.
//!
//! Records live in a map keyed by normalised email behind a Tokio `RwLock`.
//! `insert` checks and writes under one write guard, which gives the same
//! exactly-once guarantee a unique index gives a relational store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::{CredentialStore, CredentialStoreError};
use crate::domain::{Email, UserRecord};

/// Process-local [`CredentialStore`].
///
/// Use [`InMemoryCredentialStore::fail_with`] to simulate an outage; every
/// call then returns the injected error until
/// [`InMemoryCredentialStore::recover`] is called.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: RwLock<HashMap<Email, UserRecord>>,
    outage: Mutex<Option<CredentialStoreError>>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `error`.
    pub fn fail_with(&self, error: CredentialStoreError) {
        *self.outage.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Clear an injected failure.
    pub fn recover(&self) {
        *self.outage.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), CredentialStoreError> {
        match self
            .outage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserRecord>, CredentialStoreError> {
        self.check_available()?;
        Ok(self.records.read().await.get(email).cloned())
    }

    async fn insert(&self, record: &UserRecord) -> Result<(), CredentialStoreError> {
        self.check_available()?;
        let mut records = self.records.write().await;
        if records.contains_key(record.email()) {
            debug!(user_id = %record.id(), "insert rejected: email already stored");
            return Err(CredentialStoreError::conflict());
        }
        records.insert(record.email().clone(), record.clone());
        Ok(())
    }

    async fn exists_by_email(&self, email: &Email) -> Result<bool, CredentialStoreError> {
        self.check_available()?;
        Ok(self.records.read().await.contains_key(email))
    }
}
