//! Signing key loading and validation.
//!
//! The key is read from the file named by `AUTH_SIGNING_KEY_FILE`. Debug
//! builds, or deployments that opt in with `AUTH_ALLOW_EPHEMERAL_KEY`, fall
//! back to a random key when the file is missing or unusable. Tokens signed
//! with an ephemeral key stop validating on restart.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use mockable::Env;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::{SIGNING_KEY_MIN_LEN, SigningKey, SigningKeyError};

const SIGNING_KEY_DEFAULT_PATH: &str = "/var/run/secrets/auth_signing_key";
const KEY_FILE_ENV: &str = "AUTH_SIGNING_KEY_FILE";
const ALLOW_EPHEMERAL_ENV: &str = "AUTH_ALLOW_EPHEMERAL_KEY";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Build mode for signing key validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate a missing key and generate one.
    Debug,
    /// Release builds require a readable key of sufficient length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use auth_core::config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while loading the signing key.
#[derive(thiserror::Error, Debug)]
pub enum SigningKeyConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
    /// Reading the key file failed.
    #[error("failed to read signing key at {path}: {source}")]
    KeyRead {
        /// Key file location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The key file is shorter than [`SIGNING_KEY_MIN_LEN`].
    #[error("signing key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Key file location.
        path: PathBuf,
        /// Bytes read.
        length: usize,
        /// Required minimum.
        min_len: usize,
    },
}

/// Load the token signing key according to environment and build mode.
///
/// # Examples
///
/// ```rust
/// use auth_core::config::{BuildMode, signing_key_from_env};
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let key_path = dir.path().join("signing_key");
/// std::fs::write(&key_path, vec![b'k'; 32])?;
///
/// let key_path = key_path.to_string_lossy().into_owned();
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "AUTH_SIGNING_KEY_FILE" => Some(key_path.clone()),
///     _ => None,
/// });
///
/// let key = signing_key_from_env(&env, BuildMode::Release)?;
/// assert_eq!(key.fingerprint().len(), 16);
/// # Ok(())
/// # }
/// ```
pub fn signing_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SigningKey, SigningKeyConfigError> {
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SIGNING_KEY_DEFAULT_PATH.to_owned()),
    );
    let tolerant = mode.is_debug() || allow_ephemeral;

    let loaded = read_key_file(&path).and_then(|mut bytes| {
        SigningKey::new(std::mem::take(&mut *bytes)).map_err(|error| match error {
            SigningKeyError::TooShort { length, min_len } => SigningKeyConfigError::KeyTooShort {
                path: path.clone(),
                length,
                min_len,
            },
        })
    });

    match loaded {
        Ok(key) => {
            info!(fingerprint = %key.fingerprint(), "loaded token signing key");
            Ok(key)
        }
        Err(error) if tolerant => {
            let key = SigningKey::generate();
            warn!(
                path = %path.display(),
                error = %error,
                fingerprint = %key.fingerprint(),
                "using temporary signing key (dev only)"
            );
            Ok(key)
        }
        Err(error) => Err(error),
    }
}

fn read_key_file(path: &Path) -> Result<Zeroizing<Vec<u8>>, SigningKeyConfigError> {
    let read_error = |source| SigningKeyConfigError::KeyRead {
        path: path.to_path_buf(),
        source,
    };
    let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) else {
        return Err(read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "signing key path must name a file",
        )));
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    dir.read(Path::new(file_name))
        .map(Zeroizing::new)
        .map_err(read_error)
}

fn allow_ephemeral_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<bool, SigningKeyConfigError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(false);
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!(
                value = %value,
                "invalid AUTH_ALLOW_EPHEMERAL_KEY; defaulting to disabled"
            );
            Ok(false)
        }
        None => Err(SigningKeyConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "signing_key_tests.rs"]
mod tests;
