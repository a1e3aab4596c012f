//! # Bookdesk Domain
//!
//! Data types shared by every layer of the Bookdesk client core.
//!
//! This crate contains:
//! - Credential and identity records
//! - The uniform result envelope and its closed error taxonomy
//! - Client configuration structures
//! - Domain error types and constants
//!
//! ## Architecture
//! - No dependencies on other Bookdesk crates
//! - No I/O; pure data and validation

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
