//! API Module
//!
//! Typed HTTP interface to the Activity Monitor backend. Every request
//! passes through the configured [`RequestFilter`] before it is sent.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::filter::RequestFilter;
use crate::models::{
    Credentials, EquipmentStatusRequest, EquipmentStatusResponse, EquipmentsResponse, MeResponse,
    NewEquipmentRequest, NewEquipmentResponse, SignInResponse, SignUpResponse,
};

/// HTTP response with its status preserved, for callers that branch on it.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    /// Parsed body of a 2xx response; `None` when the body was empty.
    pub body: Option<T>,
    /// Raw body of a non-2xx response, when there was one.
    pub error_body: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// "HTTP 404 Not Found"
    pub fn status_line(&self) -> String {
        format!(
            "HTTP {} {}",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string()
    }
}

/// API client for the Activity Monitor backend
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    filter: Box<dyn RequestFilter>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &Config, filter: Box<dyn RequestFilter>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client,
            filter,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// POST auth/signup
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, ApiError> {
        let request = self
            .client
            .post(self.url("auth/signup"))
            .json(&Credentials { email, password });
        self.call(request).await
    }

    /// POST auth/signin
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, ApiError> {
        let request = self
            .client
            .post(self.url("auth/signin"))
            .json(&Credentials { email, password });
        self.call(request).await
    }

    /// GET auth/me
    pub async fn me(&self) -> Result<ApiResponse<MeResponse>, ApiError> {
        self.exchange(self.client.get(self.url("auth/me"))).await
    }

    /// GET devices/list
    pub async fn list_devices(
        &self,
        page_size: u32,
        page_num: u32,
    ) -> Result<ApiResponse<EquipmentsResponse>, ApiError> {
        let request = self
            .client
            .get(self.url("devices/list"))
            .query(&[("pageSize", page_size), ("pageNum", page_num)]);
        self.exchange(request).await
    }

    /// POST devices/update
    pub async fn update_device(
        &self,
        id: &str,
        status: bool,
    ) -> Result<ApiResponse<EquipmentStatusResponse>, ApiError> {
        let request = self
            .client
            .post(self.url("devices/update"))
            .json(&EquipmentStatusRequest { id, status });
        self.exchange(request).await
    }

    /// POST devices/add
    pub async fn add_device(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ApiResponse<NewEquipmentResponse>, ApiError> {
        let request = self
            .client
            .post(self.url("devices/add"))
            .json(&NewEquipmentRequest { name, description });
        self.exchange(request).await
    }

    /// Send and decode, treating any non-2xx status as an error.
    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.exchange::<T>(request).await?;

        if !response.is_success() {
            let message = response
                .error_body
                .clone()
                .unwrap_or_else(|| response.status_line());
            return Err(ApiError::Server(message));
        }

        response
            .body
            .ok_or_else(|| ApiError::Parse("Empty response body".into()))
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, ApiError> {
        let request = request
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        let request = self.filter.apply(request);

        debug!("{} {}", request.method(), request.url().path());

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        debug!("Response {} ({} bytes)", status, bytes.len());

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            return Ok(ApiResponse {
                status,
                body: None,
                error_body: (!text.is_empty()).then_some(text),
            });
        }

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            let parsed =
                serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))?;
            Some(parsed)
        };

        Ok(ApiResponse {
            status,
            body,
            error_body: None,
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport failure: connect, timeout, or a broken body stream.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx reply on an endpoint that does not expose the status.
    #[error("Server error: {0}")]
    Server(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// The request could not be built.
    #[error("Client error: {0}")]
    Client(String),
}

impl ApiError {
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// The underlying description without the category prefix.
    pub fn detail(&self) -> &str {
        match self {
            ApiError::Network(m) | ApiError::Server(m) | ApiError::Parse(m) | ApiError::Client(m) => m,
        }
    }
}
