//! Sign-in screen

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use super::{begin, OperationState, ScreenScope};
use crate::auth::AuthManager;

pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

#[derive(Debug)]
pub struct SignInScreen {
    auth: Arc<AuthManager>,
    state: Arc<watch::Sender<OperationState<()>>>,
    scope: ScreenScope,
}

impl SignInScreen {
    pub fn new(auth: Arc<AuthManager>) -> Self {
        Self {
            auth,
            state: Arc::new(watch::channel(OperationState::Idle).0),
            scope: ScreenScope::new(),
        }
    }

    pub fn state(&self) -> watch::Receiver<OperationState<()>> {
        self.state.subscribe()
    }

    /// Start signing in. Ignored while a previous attempt is in flight.
    pub fn sign_in(&self, email: &str, password: &str) {
        if !begin(&self.state) {
            return;
        }

        let auth = self.auth.clone();
        let state = self.state.clone();
        let email = email.trim().to_string();
        let password = password.to_string();

        self.scope.launch(async move {
            let next = if auth.sign_in(&email, &password).await {
                OperationState::Success(())
            } else {
                OperationState::Error(INVALID_CREDENTIALS.into())
            };
            info!("Sign-in finished: {:?}", next);
            state.send_replace(next);
        });
    }

    /// Clear any error once the user edits the form.
    pub fn reset(&self) {
        self.state.send_if_modified(|current| {
            if current.is_loading() {
                return false;
            }
            *current = OperationState::Idle;
            true
        });
    }
}
