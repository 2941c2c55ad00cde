//! Driving port for user profile queries.
//!
//! Callers must present an [`AuthenticatedSubject`], which only token
//! validation can produce; a bare, client-supplied email is not accepted.

use async_trait::async_trait;

use crate::domain::{AuthResult, AuthenticatedSubject, UserProfile};

/// Domain use-case port for reading the current user's profile.
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the profile for the authenticated subject.
    async fn fetch_profile(&self, subject: &AuthenticatedSubject) -> AuthResult<UserProfile>;
}
