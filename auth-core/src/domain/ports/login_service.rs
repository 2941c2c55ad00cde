//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! exchange credentials for a bearer token without knowing (or importing) the
//! backing store, hasher, or signing key.

use async_trait::async_trait;

use crate::domain::{AuthResult, AuthenticatedSubject, LoginCredentials, Token};

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and issue a bearer token.
    async fn login(&self, credentials: &LoginCredentials) -> AuthResult<Token>;

    /// Check a presented token and return the subject it proves.
    fn validate_token(&self, token: &Token) -> AuthResult<AuthenticatedSubject>;
}
