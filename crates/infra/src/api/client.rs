//! API client façade
//!
//! The public `get/post/put/patch/delete/upload` surface. Every call goes
//! through one generic [`ApiClient::execute`]:
//!
//! 1. GET with caching enabled: serve a live cache entry without touching
//!    the network or the loading tracker
//! 2. mark the call busy for as long as a [`LoadingGuard`] is alive
//! 3. dispatch, recovering from one 401 through the refresh coordinator
//! 4. on success, cache GET bodies or invalidate the mutated resource
//! 5. fold any failure into a [`ResultEnvelope`]
//!
//! [`LoadingGuard`]: bookdesk_common::loading::LoadingGuard

use std::sync::Arc;

use bookdesk_common::cache::CacheStats;
use bookdesk_domain::{BookdeskError, ResultEnvelope};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, instrument};

use super::cache::CacheKey;
use super::context::{ClientContext, SessionEvent};
use super::dispatcher::RequestDispatcher;
use super::errors::ApiError;
use super::refresh::{HttpTokenRefresher, RefreshCoordinator, TokenRefresher};
use super::request::{MultipartForm, RequestDescriptor, RequestOptions};
use crate::http::HttpClient;

/// Authenticated API client
///
/// Cheap to clone; clones share the context, connection pool and refresh
/// state.
#[derive(Clone)]
pub struct ApiClient {
    pub(super) context: ClientContext,
    pub(super) dispatcher: RequestDispatcher,
    pub(super) refresh: Arc<RefreshCoordinator>,
}

impl ApiClient {
    /// Create a client over `context`, refreshing through `POST /auth/refresh`
    ///
    /// # Errors
    /// Returns `BookdeskError::Config` if the HTTP client cannot be built
    pub fn new(context: ClientContext) -> Result<Self, BookdeskError> {
        let dispatcher = Self::build_dispatcher(&context)?;
        let refresher = Arc::new(HttpTokenRefresher::new(dispatcher.clone()));
        Ok(Self::assemble(context, dispatcher, refresher))
    }

    /// Create a client with a custom [`TokenRefresher`]
    ///
    /// # Errors
    /// Returns `BookdeskError::Config` if the HTTP client cannot be built
    pub fn with_refresher(
        context: ClientContext,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Result<Self, BookdeskError> {
        let dispatcher = Self::build_dispatcher(&context)?;
        Ok(Self::assemble(context, dispatcher, refresher))
    }

    fn build_dispatcher(context: &ClientContext) -> Result<RequestDispatcher, BookdeskError> {
        let config = context.config();
        let mut builder = HttpClient::builder().timeout(config.request_timeout());
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        Ok(RequestDispatcher::new(builder.build()?, config.normalized_base_url()))
    }

    fn assemble(
        context: ClientContext,
        dispatcher: RequestDispatcher,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Self {
        let refresh = Arc::new(RefreshCoordinator::new(context.clone(), refresher));
        Self { context, dispatcher, refresh }
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    /// GET `path`, served from cache while a previous response is live
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ResultEnvelope<T> {
        self.execute(RequestDescriptor::get(path)).await
    }

    /// GET with query parameters, headers or cache options
    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ResultEnvelope<T> {
        self.execute(RequestDescriptor::get(path).with_options(options)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ResultEnvelope<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match to_json(body) {
            Ok(body) => self.execute(RequestDescriptor::post(path, body)).await,
            Err(err) => err.into_envelope(),
        }
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ResultEnvelope<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match to_json(body) {
            Ok(body) => self.execute(RequestDescriptor::put(path, body)).await,
            Err(err) => err.into_envelope(),
        }
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ResultEnvelope<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match to_json(body) {
            Ok(body) => self.execute(RequestDescriptor::patch(path, body)).await,
            Err(err) => err.into_envelope(),
        }
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ResultEnvelope<T> {
        self.execute(RequestDescriptor::delete(path)).await
    }

    /// POST a `multipart/form-data` body
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> ResultEnvelope<T> {
        self.execute(RequestDescriptor::upload(path, form)).await
    }

    /// Run any request descriptor and normalize the outcome
    #[instrument(skip(self, request), fields(verb = %request.verb, path = %request.path))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> ResultEnvelope<T> {
        if request.is_cacheable() {
            if let Some(cached) = self.context.cache().get(&CacheKey::for_request(&request)) {
                debug!("serving cached response");
                return decode_envelope(cached);
            }
        }

        match self.perform(&request).await {
            Ok(value) => decode_envelope(value),
            Err(err) => {
                debug!(error = %err, kind = %err.kind(), "request failed");
                err.into_envelope()
            }
        }
    }

    /// Dispatch under a loading guard and apply cache side effects
    pub(super) async fn perform(&self, request: &RequestDescriptor) -> Result<Value, ApiError> {
        let _busy = self.context.loading().guard(request.loading_key());

        let response = self.refresh.execute(&self.dispatcher, request).await?;
        let value = response.json()?;

        if request.is_cacheable() {
            self.context.cache().set(
                CacheKey::for_request(request),
                value.clone(),
                request.options.cache_ttl,
            );
        } else if request.verb.is_mutation() {
            self.context.cache().invalidate_prefix(&request.path);
        }

        Ok(value)
    }

    /// Drop cached reads of `resource` after an out-of-band mutation
    pub fn invalidate_cache(&self, resource: &str) -> usize {
        self.context.cache().invalidate_prefix(resource)
    }

    /// Drop every cached response
    ///
    /// Hit and miss counters are kept; the dropped entries are counted as
    /// invalidations in [`cache_stats`](Self::cache_stats).
    pub fn clear_cache(&self) {
        self.context.cache().clear_all();
    }

    /// Drop expired cache entries; returns how many were removed
    pub fn sweep_cache(&self) -> usize {
        self.context.cache().sweep()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.context.cache().stats()
    }

    /// Whether any call whose loading key starts with `prefix` is in flight
    pub fn is_loading(&self, prefix: &str) -> bool {
        self.context.loading().is_busy(prefix)
    }

    pub fn is_any_loading(&self) -> bool {
        self.context.loading().is_any_busy()
    }

    /// Session events (`SignedIn`, `SignedOut`, `Expired`)
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.context.subscribe()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.dispatcher.base_url())
            .field("refresh", &self.refresh)
            .finish_non_exhaustive()
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn decode_envelope<T: DeserializeOwned>(value: Value) -> ResultEnvelope<T> {
    match serde_json::from_value(value) {
        Ok(data) => ResultEnvelope::success(data),
        Err(e) => ApiError::Decode(e.to_string()).into_envelope(),
    }
}
