//! Request dispatcher
//!
//! Performs one transport call for a [`RequestDescriptor`]. Status codes are
//! not interpreted here beyond success vs. failure.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use super::errors::ApiError;
use super::request::{RequestBody, RequestDescriptor};
use crate::http::HttpClient;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Raw success payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    /// Decode the body as JSON; empty bodies and 204/205 decode as `null`.
    ///
    /// # Errors
    /// Returns `ApiError::Decode` if a non-empty body is not JSON
    pub fn json(&self) -> Result<Value, ApiError> {
        if self.status == StatusCode::NO_CONTENT
            || self.status == StatusCode::RESET_CONTENT
            || self.body.trim().is_empty()
        {
            return Ok(Value::Null);
        }

        serde_json::from_str(&self.body)
            .map_err(|e| ApiError::Decode(format!("response is not valid JSON: {e}")))
    }
}

/// Sends descriptors relative to the configured base URL
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    http: HttpClient,
    base_url: String,
}

impl RequestDispatcher {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.http.timeout()
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Send `request` once, with `Authorization: Bearer <token>` when a token
    /// is given
    ///
    /// # Errors
    /// Returns `ApiError::Status` for any non-success status (with the body),
    /// `ApiError::Timeout` when the fixed timeout fires and
    /// `ApiError::Network` when no response arrived.
    pub async fn dispatch(
        &self,
        request: &RequestDescriptor,
        token: Option<&str>,
    ) -> Result<RawResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder =
            self.http.request(request.verb.method(), &url).header(ACCEPT, JSON_CONTENT_TYPE);

        if !request.options.params.is_empty() {
            builder = builder.query(&request.options.params);
        }

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        for (name, value) in &request.options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            Some(RequestBody::Json(body)) => builder.json(body),
            Some(RequestBody::Multipart(form)) => builder.multipart(form.to_form()?),
            None => builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE),
        };

        debug!(
            verb = %request.verb,
            path = %request.path,
            authenticated = token.is_some(),
            "dispatching request"
        );

        let timeout = self.http.timeout();
        let response =
            self.http.send(builder).await.map_err(|e| ApiError::from_transport(&e, timeout))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::from_transport(&e, timeout))?;

        if status.is_success() {
            Ok(RawResponse { status, body })
        } else {
            debug!(verb = %request.verb, path = %request.path, %status, "request rejected");
            Err(ApiError::Status { status: status.as_u16(), body })
        }
    }
}
