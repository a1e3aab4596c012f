//! HTTP transport
//!
//! The only place `reqwest::Client` is constructed.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
