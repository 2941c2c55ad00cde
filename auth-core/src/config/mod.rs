//! Authentication settings loaded via OrthoConfig.
//!
//! Numeric fields are optional and the character-class switches default to
//! on, so an empty environment yields the production configuration. The signing key is
//! loaded separately by [`signing_key_from_env`] because it is a secret read
//! from a file, not a tunable.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{HashingError, HashingParams, PasswordHasher, PasswordPolicy};

pub mod signing_key;

pub use signing_key::{BuildMode, SigningKeyConfigError, signing_key_from_env};

const DEFAULT_TOKEN_TTL_SECS: u64 = 3_600;

/// Tunables for password policy, hashing cost, and token lifetime.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "AUTH")]
pub struct AuthSettings {
    /// Token lifetime in seconds.
    pub token_ttl_secs: Option<u64>,
    /// Minimum password length in characters.
    pub password_min_length: Option<usize>,
    /// Maximum password length in characters.
    pub password_max_length: Option<usize>,
    /// Require at least one upper-case letter.
    #[ortho_config(default = true)]
    pub password_require_uppercase: bool,
    /// Require at least one lower-case letter.
    #[ortho_config(default = true)]
    pub password_require_lowercase: bool,
    /// Require at least one decimal digit.
    #[ortho_config(default = true)]
    pub password_require_digit: bool,
    /// Require at least one symbol.
    #[ortho_config(default = true)]
    pub password_require_symbol: bool,
    /// Argon2 memory cost in KiB.
    pub hash_memory_kib: Option<u32>,
    /// Argon2 pass count.
    pub hash_iterations: Option<u32>,
    /// Argon2 lane count.
    pub hash_parallelism: Option<u32>,
    /// Upper bound on how long a caller waits for hashing, in milliseconds.
    pub hash_timeout_ms: Option<u64>,
}

impl AuthSettings {
    /// Token lifetime, defaulting to one hour.
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS))
    }

    /// Optional hashing wait bound; unset means wait indefinitely.
    pub fn hash_timeout(&self) -> Option<Duration> {
        self.hash_timeout_ms.map(Duration::from_millis)
    }

    /// Password policy with configured overrides applied.
    pub fn policy(&self) -> PasswordPolicy {
        let defaults = PasswordPolicy::default();
        PasswordPolicy {
            min_length: self.password_min_length.unwrap_or(defaults.min_length),
            max_length: self.password_max_length.unwrap_or(defaults.max_length),
            require_uppercase: self.password_require_uppercase,
            require_lowercase: self.password_require_lowercase,
            require_digit: self.password_require_digit,
            require_symbol: self.password_require_symbol,
        }
    }

    /// Argon2 cost parameters with configured overrides applied.
    pub fn hashing_params(&self) -> HashingParams {
        let defaults = HashingParams::default();
        HashingParams {
            memory_kib: self.hash_memory_kib.unwrap_or(defaults.memory_kib),
            iterations: self.hash_iterations.unwrap_or(defaults.iterations),
            parallelism: self.hash_parallelism.unwrap_or(defaults.parallelism),
        }
    }

    /// Build a hasher from [`Self::hashing_params`].
    ///
    /// Fails when Argon2 rejects the configured cost parameters.
    pub fn hasher(&self) -> Result<PasswordHasher, HashingError> {
        PasswordHasher::new(self.hashing_params())
    }
}
