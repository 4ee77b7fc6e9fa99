//! Main API client implementation

use crate::config::ClientConfig;
use crate::endpoints::{AuthApi, PrescriptionsApi, RecordsApi};
use crate::error::{ApiError, ApiResult, ErrorContext};
use crate::session::SessionManager;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Medrec API client
///
/// This client wraps `reqwest` and adds:
/// - Bearer authentication from the persisted session
/// - Normalized errors carrying the backend's `message`
/// - Request correlation IDs for tracing
///
/// Calls are never retried. A failed request reports once.
#[derive(Clone)]
pub struct MedrecClient {
    inner: Client,
    config: Arc<ClientConfig>,
    base: Arc<Url>,
    session: SessionManager,
}

impl std::fmt::Debug for MedrecClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MedrecClient")
            .field("base_url", &self.config.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl MedrecClient {
    /// Create a client from environment configuration with an in-memory session
    pub fn new() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        let session = SessionManager::in_memory(config.session_ttl);
        Self::with_config(config, session)
    }

    /// Create a client with specific configuration and session storage
    pub fn with_config(config: ClientConfig, session: SessionManager) -> ApiResult<Self> {
        config.validate()?;

        let base = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("medrec-api-client/", env!("CARGO_PKG_VERSION"))),
        );

        let mut builder = Client::builder().default_headers(default_headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let inner = builder.build().map_err(ApiError::Transport)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
            base: Arc::new(base),
            session,
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Session state used for bearer authentication
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Access signup/login endpoints
    #[must_use]
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access medical record endpoints
    #[must_use]
    pub fn records(&self) -> RecordsApi {
        RecordsApi::new(self.clone())
    }

    /// Access prescription (medication request) endpoints
    #[must_use]
    pub fn prescriptions(&self) -> PrescriptionsApi {
        PrescriptionsApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Low-level HTTP methods
    // -------------------------------------------------------------------------

    /// Perform a GET request
    #[instrument(skip(self), fields(request_id))]
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        self.request(Method::GET, segments, Option::<&()>::None).await
    }

    /// Perform a POST request
    #[instrument(skip(self, body), fields(request_id))]
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> ApiResult<T> {
        self.request(Method::POST, segments, Some(body)).await
    }

    /// Perform a PUT request
    #[instrument(skip(self, body), fields(request_id))]
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> ApiResult<T> {
        self.request(Method::PUT, segments, Some(body)).await
    }

    /// Perform a PATCH request
    #[instrument(skip(self, body), fields(request_id))]
    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> ApiResult<T> {
        self.request(Method::PATCH, segments, Some(body)).await
    }

    /// Perform a DELETE request
    #[instrument(skip(self), fields(request_id))]
    pub async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        self.request(Method::DELETE, segments, Option::<&()>::None).await
    }

    /// Build the absolute URL for a sequence of path segments
    ///
    /// Segments are percent-encoded, so identifiers containing `/` or `?`
    /// stay within a single segment.
    pub fn url_for(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = (*self.base).clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Execute a request and decode the JSON response
    pub async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> ApiResult<T> {
        let url = self.url_for(segments)?;
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let start = Instant::now();
        let result = self
            .execute_single_request(&request_id, method.clone(), url.clone(), body)
            .await;
        let elapsed = start.elapsed();

        match result {
            Ok(value) => {
                debug!(
                    request_id = %request_id,
                    method = %method,
                    path = url.path(),
                    elapsed_ms = elapsed.as_millis(),
                    "Request succeeded"
                );
                Ok(value)
            }
            Err(e) => {
                let context = ErrorContext {
                    request_id: Some(request_id),
                    endpoint: url.path().to_string(),
                    method: method.to_string(),
                };
                warn!(
                    context = %context,
                    status = e.status(),
                    elapsed_ms = elapsed.as_millis(),
                    error = %e,
                    "Request failed"
                );
                Err(e)
            }
        }
    }

    /// Execute a single request
    async fn execute_single_request<T: DeserializeOwned, B: Serialize>(
        &self,
        request_id: &str,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let mut request = self
            .inner
            .request(method, url)
            .header(X_REQUEST_ID, request_id);

        if let Some(token) = self.session.get_token()? {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Handle HTTP response and deserialize
    ///
    /// An empty success body decodes as JSON `null`.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ApiResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(serde_json::from_value(Value::Null)?);
            }
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            let body = String::from_utf8_lossy(&bytes);
            Err(ApiError::from_response_body(status.as_u16(), &body))
        }
    }
}
