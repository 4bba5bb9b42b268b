//! Request Filter Module
//!
//! Attaches the stored auth token to outgoing requests.

use std::sync::Arc;

use reqwest::header::HeaderValue;
use reqwest::Request;
use tracing::warn;

use crate::storage::TokenSource;

/// Header carrying the auth token.
pub const AUTH_HEADER: &str = "x-api-auth";

/// A synchronous transformation applied to every outgoing request.
pub trait RequestFilter: Send + Sync {
    fn apply(&self, request: Request) -> Request;
}

/// Adds `x-api-auth: <token>` when a non-empty token is stored.
#[derive(Clone)]
pub struct TokenInjector {
    source: Arc<dyn TokenSource>,
}

impl TokenInjector {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self { source }
    }
}

impl RequestFilter for TokenInjector {
    fn apply(&self, mut request: Request) -> Request {
        let Some(token) = self.source.token().filter(|t| !t.is_empty()) else {
            return request;
        };

        match HeaderValue::from_str(&token) {
            Ok(value) => {
                request.headers_mut().insert(AUTH_HEADER, value);
            }
            Err(_) => warn!("Stored token is not a valid header value; sending request without it"),
        }

        request
    }
}

impl std::fmt::Debug for TokenInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenInjector").finish_non_exhaustive()
    }
}
