//! Authenticated API client
//!
//! # Architecture
//!
//! - [`ClientContext`]: credential store, response cache, loading tracker
//!   and session events, constructed once at start-up
//! - [`RequestDispatcher`]: one transport call with bearer header and a
//!   fixed timeout
//! - [`RefreshCoordinator`]: coalesced refresh-and-replay on 401
//! - [`ApiClient`]: the `get/post/put/patch/delete/upload` façade returning
//!   [`ResultEnvelope`](bookdesk_domain::ResultEnvelope)

pub mod cache;
pub mod client;
pub mod context;
pub mod dispatcher;
pub mod errors;
pub mod refresh;
pub mod request;
mod session;

pub use cache::{resource_prefix, CacheKey, ResponseCache};
pub use client::ApiClient;
pub use context::{ClientContext, SessionEvent};
pub use dispatcher::{RawResponse, RequestDispatcher};
pub use errors::ApiError;
pub use refresh::{HttpTokenRefresher, RefreshCoordinator, RefreshError, TokenRefresher};
pub use request::{
    FormPart, HttpVerb, MultipartForm, RequestBody, RequestDescriptor, RequestOptions,
};
