//! Driving port for account registration.

use async_trait::async_trait;

use crate::domain::{AuthResult, RegistrationRequest, UserProfile};

/// Domain use-case port for creating accounts.
#[async_trait]
pub trait RegistrationCommand: Send + Sync {
    /// Register a new account and return its public profile.
    async fn register(&self, request: RegistrationRequest) -> AuthResult<UserProfile>;
}
