//! Client-local secret storage
//!
//! [`SecretStore`] is the key-value seam the credential store persists
//! through. Two backends ship with the crate:
//!
//! - [`KeychainProvider`] (feature `platform`): macOS Keychain, Windows
//!   Credential Manager, or Linux Secret Service via `keyring`
//! - [`MemorySecretStore`]: process-local map for tests and hosts that must
//!   not persist credentials

#[cfg(feature = "platform")]
mod keychain;
mod memory;
mod traits;

#[cfg(feature = "platform")]
pub use keychain::KeychainProvider;
pub use memory::MemorySecretStore;
pub use traits::{SecretStore, SecretStoreError};
