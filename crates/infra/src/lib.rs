//! Infrastructure layer for the Bookdesk client core.
//!
//! Everything that touches the network or a configuration source:
//! - [`http`]: the reqwest-backed transport
//! - [`api`]: request dispatch, coalesced credential refresh, response
//!   caching and the `ApiClient` façade
//! - [`config`]: environment and file configuration loading
//! - [`errors`]: conversions from foreign errors into `BookdeskError`

pub mod api;
pub mod config;
pub mod errors;
pub mod http;

pub use api::{ApiClient, ClientContext, SessionEvent};
pub use errors::InfraError;
pub use http::HttpClient;
