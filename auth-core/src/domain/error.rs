//! Authentication outcome taxonomy.
//!
//! These errors are transport agnostic. Callers map them to HTTP responses,
//! RPC status codes, or CLI exit codes. No variant ever carries a plaintext
//! password, a password hash, or token material in its message.

use serde::{Deserialize, Serialize};

use crate::domain::password::PasswordPolicyViolations;
use crate::domain::token::TokenRejection;
use crate::domain::{LoginValidationError, UserValidationError};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The request conflicts with existing state.
    Conflict,
    /// Authentication failed or the presented token is unusable.
    Unauthorized,
    /// The requested resource does not exist.
    NotFound,
    /// A collaborator is temporarily unavailable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the core.
    InternalError,
}

/// Reasons a registration or login payload was rejected before any
/// credential check took place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    /// A user record field (email, display name, phone) was invalid.
    #[error(transparent)]
    User(#[from] UserValidationError),
    /// Login input was structurally empty.
    #[error(transparent)]
    Login(#[from] LoginValidationError),
    /// The password does not satisfy the configured strength policy.
    #[error(transparent)]
    Password(#[from] PasswordPolicyViolations),
    /// The password confirmation differs from the password.
    #[error("password confirmation does not match")]
    PasswordMismatch,
}

/// Failure returned by every [`AuthService`](crate::domain::AuthService)
/// operation.
///
/// `Ok(token)` plays the role of the success arm; the remaining outcomes are
/// the variants below.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Input was malformed or the password is too weak.
    #[error("validation failed: {0}")]
    ValidationFailed(ValidationFailure),
    /// Another account already uses the email.
    #[error("email is already registered")]
    EmailAlreadyRegistered,
    /// Unknown email or wrong password; the two are deliberately conflated.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The token is expired, tampered with, or malformed.
    #[error("token rejected: {0}")]
    TokenInvalid(TokenRejection),
    /// No user exists for an authenticated subject.
    #[error("user not found")]
    NotFound,
    /// The credential store failed or timed out.
    #[error("credential store unavailable: {message}")]
    StoreUnavailable {
        /// Adapter-supplied description of the failure.
        message: String,
    },
    /// Password hashing did not finish within the configured budget.
    #[error("password hashing unavailable: {message}")]
    HashingUnavailable {
        /// Description of the scheduling failure.
        message: String,
    },
    /// Unexpected internal failure, such as a corrupt stored hash.
    #[error("internal error: {message}")]
    Internal {
        /// Description safe to surface in logs.
        message: String,
    },
}

impl AuthError {
    /// Stable machine-readable error code.
    ///
    /// # Examples
    /// ```
    /// use auth_core::domain::{AuthError, ErrorCode};
    ///
    /// assert_eq!(AuthError::InvalidCredentials.code(), ErrorCode::Unauthorized);
    /// ```
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ValidationFailed(_) => ErrorCode::InvalidRequest,
            Self::EmailAlreadyRegistered => ErrorCode::Conflict,
            Self::InvalidCredentials | Self::TokenInvalid(_) => ErrorCode::Unauthorized,
            Self::NotFound => ErrorCode::NotFound,
            Self::StoreUnavailable { .. } | Self::HashingUnavailable { .. } => {
                ErrorCode::ServiceUnavailable
            }
            Self::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Whether the caller may retry the identical request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. } | Self::HashingUnavailable { .. }
        )
    }

    /// Convenience constructor for [`AuthError::StoreUnavailable`].
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`AuthError::HashingUnavailable`].
    pub fn hashing_unavailable(message: impl Into<String>) -> Self {
        Self::HashingUnavailable {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`AuthError::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<ValidationFailure> for AuthError {
    fn from(value: ValidationFailure) -> Self {
        Self::ValidationFailed(value)
    }
}

impl From<UserValidationError> for AuthError {
    fn from(value: UserValidationError) -> Self {
        Self::ValidationFailed(value.into())
    }
}

impl From<LoginValidationError> for AuthError {
    fn from(value: LoginValidationError) -> Self {
        Self::ValidationFailed(value.into())
    }
}

impl From<PasswordPolicyViolations> for AuthError {
    fn from(value: PasswordPolicyViolations) -> Self {
        Self::ValidationFailed(value.into())
    }
}

impl From<TokenRejection> for AuthError {
    fn from(value: TokenRejection) -> Self {
        Self::TokenInvalid(value)
    }
}

/// Convenient result alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
