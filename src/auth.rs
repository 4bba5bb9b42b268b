//! Authentication Module
//!
//! Owns the sign-in/sign-up/sign-out flows and the current-user fetch, and
//! publishes the session as observable state.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::models::{MeResponse, Outcome, User, STATUS_SUCCESS};
use crate::storage::PreferenceStore;

pub const MISSING_TOKEN: &str = "Authentication token is missing.";
pub const UNKNOWN_ERROR: &str = "Unknown error occurred.";
pub const UNKNOWN_SERVER_ERROR: &str = "Unknown server error.";
pub const NETWORK_ERROR: &str = "Network error. Please try again.";
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

/// Manages authentication state
pub struct AuthManager {
    api: Arc<ApiClient>,
    preferences: Arc<PreferenceStore>,
    token: Arc<watch::Sender<Option<String>>>,
    current_user: watch::Sender<Option<User>>,
    me_outcome: watch::Sender<Option<Outcome<User>>>,
    mirror: JoinHandle<()>,
}

impl AuthManager {
    /// Create the manager and start mirroring the persisted token into memory.
    ///
    /// Must be called from within a Tokio runtime. The mirroring task stops
    /// when the manager is dropped.
    pub fn new(api: Arc<ApiClient>, preferences: Arc<PreferenceStore>) -> Self {
        let token = Arc::new(watch::channel(preferences.token_now()).0);
        let mirror = tokio::spawn(mirror_token(preferences.token_stream(), token.clone()));

        Self {
            api,
            preferences,
            token,
            current_user: watch::channel(None).0,
            me_outcome: watch::channel(None).0,
            mirror,
        }
    }

    pub fn token(&self) -> watch::Receiver<Option<String>> {
        self.token.subscribe()
    }

    pub fn current_user(&self) -> watch::Receiver<Option<User>> {
        self.current_user.subscribe()
    }

    /// Outcome of the last current-user fetch.
    pub fn me_outcome(&self) -> watch::Receiver<Option<Outcome<User>>> {
        self.me_outcome.subscribe()
    }

    /// Check if currently authenticated
    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    /// Register a new account. Any failure is reported as `false`.
    pub async fn sign_up(&self, email: &str, password: &str) -> bool {
        match self.api.sign_up(email, password).await {
            Ok(response) if response.is_success() => {
                info!("Account created");
                true
            }
            Ok(response) => {
                debug!("Sign-up rejected: {:?}", response.message);
                false
            }
            Err(e) => {
                warn!("Sign-up failed: {}", e);
                false
            }
        }
    }

    /// Exchange credentials for a token, persisting it on success.
    pub async fn sign_in(&self, email: &str, password: &str) -> bool {
        let response = match self.api.sign_in(email, password).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Sign-in failed: {}", e);
                return false;
            }
        };

        let Some(token) = response.token() else {
            debug!("Sign-in rejected: {:?}", response.message);
            return false;
        };

        if let Err(e) = self.preferences.save_token(token).await {
            error!("Failed to persist token: {}", e);
            return false;
        }

        self.token.send_replace(Some(token.to_string()));
        info!("Signed in");
        true
    }

    /// Fetch the signed-in user and publish the outcome.
    ///
    /// Failures that imply a stale token invalidate the session.
    pub async fn fetch_current_user(&self) {
        if self.preferences.token_now().is_none() {
            self.invalidate().await;
            self.publish_me(Outcome::Error(MISSING_TOKEN.into()));
            return;
        }

        match self.api.me().await {
            Ok(response) if response.is_success() => {
                match response.body.unwrap_or_default() {
                    MeResponse {
                        status: Some(status),
                        data: Some(data),
                        ..
                    } if status == STATUS_SUCCESS => {
                        info!("Fetched current user {}", data.user.id);
                        self.current_user.send_replace(Some(data.user.clone()));
                        self.publish_me(Outcome::Success(data.user));
                    }
                    MeResponse {
                        error: Some(message),
                        ..
                    } => {
                        self.invalidate().await;
                        self.publish_me(Outcome::Error(message));
                    }
                    _ => self.publish_me(Outcome::Error(UNKNOWN_ERROR.into())),
                }
            }
            Ok(response) => {
                warn!("Profile fetch returned {}", response.status);
                let message = response
                    .error_body
                    .unwrap_or_else(|| UNKNOWN_SERVER_ERROR.to_string());
                self.invalidate().await;
                self.publish_me(Outcome::Error(message));
            }
            Err(e) if e.is_network() => {
                error!("Profile fetch failed: {}", e);
                self.publish_me(Outcome::Error(NETWORK_ERROR.into()));
            }
            Err(e) => {
                error!("Profile fetch failed: {}", e);
                self.publish_me(Outcome::Error(UNEXPECTED_ERROR.into()));
            }
        }
    }

    /// Clear the session unconditionally.
    pub async fn log_out(&self) {
        info!("Logging out");
        self.token.send_replace(None);
        self.current_user.send_replace(None);
        self.me_outcome.send_replace(None);
        if let Err(e) = self.preferences.clear_token().await {
            error!("Failed to clear stored token: {}", e);
        }
    }

    async fn invalidate(&self) {
        info!("Session invalidated");
        self.token.send_replace(None);
        self.current_user.send_replace(None);
        if let Err(e) = self.preferences.clear_token().await {
            error!("Failed to clear stored token: {}", e);
        }
    }

    fn publish_me(&self, outcome: Outcome<User>) {
        if let Outcome::Error(message) = &outcome {
            debug!("Profile outcome: {}", message);
        }
        self.me_outcome.send_replace(Some(outcome));
    }
}

impl Drop for AuthManager {
    fn drop(&mut self) {
        self.mirror.abort();
    }
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

async fn mirror_token(
    mut persisted: watch::Receiver<Option<String>>,
    token: Arc<watch::Sender<Option<String>>>,
) {
    loop {
        let saved = persisted.borrow_and_update().clone();
        token.send_if_modified(|current| {
            if *current == saved {
                false
            } else {
                *current = saved;
                true
            }
        });

        if persisted.changed().await.is_err() {
            break;
        }
    }
}
