//! Authentication core library modules.
//!
//! Registration, login, stateless token validation, and profile lookup,
//! independent of any transport or persistence engine.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use domain::{AuthError, AuthResult, AuthService};
