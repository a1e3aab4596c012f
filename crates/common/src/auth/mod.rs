//! Credential persistence
//!
//! The [`CredentialStore`] owns the access/refresh pair and the signed-in
//! identity. It is a pure accessor: validity is decided by the server.

mod credential_store;

pub use credential_store::CredentialStore;
