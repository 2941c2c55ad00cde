//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_store;
mod login_service;
mod registration_command;
mod user_profile_query;

#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::{CredentialStore, CredentialStoreError};
pub use login_service::LoginService;
pub use registration_command::RegistrationCommand;
pub use user_profile_query::UserProfileQuery;
