//! Driven port for durable credential storage.
//!
//! The store owns the uniqueness guarantee: `insert` must be atomic with
//! respect to the email key so that two concurrent registrations for the same
//! address yield exactly one success and one [`CredentialStoreError::Conflict`].

use async_trait::async_trait;

use crate::domain::{Email, UserRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential store adapters.
    pub enum CredentialStoreError {
        /// A record with the same email already exists.
        Conflict => "credential store already holds a record for this email",
        /// Store connection could not be established.
        Connection { message: String } => "credential store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "credential store query failed: {message}",
        /// The store did not answer in time.
        Timeout { message: String } => "credential store timed out: {message}",
    }
}

/// Port for reading and inserting user records keyed by email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the record registered under `email`.
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<UserRecord>, CredentialStoreError>;

    /// Insert a new record, failing with `Conflict` if the email is taken.
    async fn insert(&self, record: &UserRecord) -> Result<(), CredentialStoreError>;

    /// Whether any record is registered under `email`.
    async fn exists_by_email(&self, email: &Email) -> Result<bool, CredentialStoreError>;
}
