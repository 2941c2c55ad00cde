//! Outbound adapters implementing domain ports.
//!
//! Adapters are thin translators between domain types and a storage
//! representation. They contain no business logic.
//!
//! - **memory**: process-local credential store for tests, demos, and the
//!   `authctl` tool

pub mod memory;
