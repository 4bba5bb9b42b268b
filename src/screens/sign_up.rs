//! Sign-up screen

use std::sync::Arc;

use tokio::sync::watch;

use super::{begin, OperationState, ScreenScope};
use crate::auth::AuthManager;

pub const SIGN_UP_FAILED: &str = "Could not create the account.";

#[derive(Debug)]
pub struct SignUpScreen {
    auth: Arc<AuthManager>,
    state: Arc<watch::Sender<OperationState<()>>>,
    scope: ScreenScope,
}

impl SignUpScreen {
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

    pub fn sign_up(&self, email: &str, password: &str) {
        if !begin(&self.state) {
            return;
        }

        let auth = self.auth.clone();
        let state = self.state.clone();
        let email = email.trim().to_string();
        let password = password.to_string();

        self.scope.launch(async move {
            let next = if auth.sign_up(&email, &password).await {
                OperationState::Success(())
            } else {
                OperationState::Error(SIGN_UP_FAILED.into())
            };
            state.send_replace(next);
        });
    }
}
