//! Authentication domain: users, passwords, tokens, and the service that
//! ties them together.
//!
//! Purpose: define strongly typed domain entities and the use-cases that
//! operate on them. Adapters live in [`crate::outbound`]; nothing here knows
//! how records are persisted.

pub mod auth;
pub mod auth_service;
pub mod error;
pub mod password;
pub mod ports;
pub mod token;
pub mod user;

pub use self::auth::{LoginCredentials, LoginValidationError, RegistrationRequest};
pub use self::auth_service::AuthService;
pub use self::error::{AuthError, AuthResult, ErrorCode, ValidationFailure};
pub use self::password::{
    HashingError, HashingParams, PasswordHash, PasswordHasher, PasswordPolicy,
    PasswordPolicyViolations, PasswordRule,
};
pub use self::token::{
    AuthenticatedSubject, SIGNING_KEY_MIN_LEN, SigningKey, SigningKeyError, Token, TokenClaims,
    TokenRejection, TokenService,
};
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, EMAIL_MAX, Email, PhoneNumber, UserId, UserProfile,
    UserRecord, UserValidationError,
};
