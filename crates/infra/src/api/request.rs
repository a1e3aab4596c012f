//! Request descriptor
//!
//! One tagged descriptor `{verb, path, body?, options}` is consumed by the
//! façade's generic `execute`. Bodies are held in a replayable form so the
//! same request can be re-sent after a credential refresh.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

use super::errors::ApiError;

/// HTTP verbs the client issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Patch => Method::PATCH,
            Self::Delete => Method::DELETE,
        }
    }

    /// Whether a successful call invalidates cached reads of its resource
    pub fn is_mutation(self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call options
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// Query parameters; ordered so cache keys are stable
    pub params: BTreeMap<String, String>,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    /// Read from and write to the response cache (GET only)
    pub use_cache: bool,
    /// Override of the configured cache TTL
    pub cache_ttl: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { params: BTreeMap::new(), headers: Vec::new(), use_cache: true, cache_ttl: None }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Query parameters serialized as `k=v&k=v`, sorted by key
    pub fn serialized_params(&self) -> String {
        self.params.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
    }
}

/// One part of a multipart form
#[derive(Clone, PartialEq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file_name: String, mime_type: String, bytes: Vec<u8> },
}

impl fmt::Debug for FormPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { name, .. } => f.debug_struct("Text").field("name", name).finish(),
            Self::File { name, file_name, mime_type, bytes } => f
                .debug_struct("File")
                .field("name", name)
                .field("file_name", file_name)
                .field("mime_type", mime_type)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// Replayable `multipart/form-data` body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text { name: name.into(), value: value.into() });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Build a fresh `reqwest` form; called once per send attempt.
    ///
    /// # Errors
    /// Returns `ApiError::Serialization` if a MIME type does not parse
    pub fn to_form(&self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for part in &self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File { name, file_name, mime_type, bytes } => {
                    let part = reqwest::multipart::Part::bytes(bytes.clone())
                        .file_name(file_name.clone())
                        .mime_str(mime_type)
                        .map_err(|e| {
                            ApiError::Serialization(format!("invalid MIME type {mime_type}: {e}"))
                        })?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartForm),
}

/// Tagged request `{verb, path, body?, options}`
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub verb: HttpVerb,
    pub path: String,
    pub body: Option<RequestBody>,
    pub options: RequestOptions,
}

impl RequestDescriptor {
    pub fn new(verb: HttpVerb, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') { path } else { format!("/{path}") };
        Self { verb, path, body: None, options: RequestOptions::default() }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpVerb::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpVerb::Post, path).with_json(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpVerb::Put, path).with_json(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpVerb::Patch, path).with_json(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpVerb::Delete, path)
    }

    pub fn upload(path: impl Into<String>, form: MultipartForm) -> Self {
        let mut descriptor = Self::new(HttpVerb::Post, path);
        descriptor.body = Some(RequestBody::Multipart(form));
        descriptor
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Loading-tracker key: `"{path} {VERB}"`
    pub fn loading_key(&self) -> String {
        format!("{} {}", self.path, self.verb)
    }

    /// Whether the response may be served from or written to the cache
    pub fn is_cacheable(&self) -> bool {
        self.verb == HttpVerb::Get && self.options.use_cache
    }
}
