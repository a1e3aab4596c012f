//! Domain types and models

pub mod credentials;
pub mod envelope;

pub use credentials::{Credentials, Identity, LoginRequest, LoginResponse, RefreshResponse};
pub use envelope::{ErrorKind, ResultEnvelope};
