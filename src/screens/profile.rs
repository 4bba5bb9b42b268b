//! Profile screen: current user, language preference and sign-out.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::error;

use super::ScreenScope;
use crate::auth::AuthManager;
use crate::models::{Outcome, User};
use crate::storage::{PreferenceStore, DEFAULT_LANGUAGE};

#[derive(Debug)]
pub struct ProfileScreen {
    auth: Arc<AuthManager>,
    preferences: Arc<PreferenceStore>,
    scope: ScreenScope,
}

impl ProfileScreen {
    pub fn new(auth: Arc<AuthManager>, preferences: Arc<PreferenceStore>) -> Self {
        Self {
            auth,
            preferences,
            scope: ScreenScope::new(),
        }
    }

    /// Called when the screen becomes visible.
    pub fn on_enter(&self) {
        let auth = self.auth.clone();
        self.scope.launch(async move { auth.fetch_current_user().await });
    }

    pub fn current_user(&self) -> watch::Receiver<Option<User>> {
        self.auth.current_user()
    }

    pub fn me_outcome(&self) -> watch::Receiver<Option<Outcome<User>>> {
        self.auth.me_outcome()
    }

    pub fn language(&self) -> watch::Receiver<String> {
        self.preferences.language_stream()
    }

    pub fn save_language(&self, code: &str) {
        let preferences = self.preferences.clone();
        let code = code.trim().to_string();
        self.scope.launch(async move {
            if let Err(e) = preferences.save_language(&code).await {
                error!("Failed to save language: {}", e);
            }
        });
    }

    /// The language a toggle would switch to.
    pub fn next_language(&self) -> &'static str {
        toggled(&self.preferences.language())
    }

    /// Switch between Azerbaijani and English.
    pub fn toggle_language(&self) {
        self.save_language(self.next_language());
    }

    pub fn sign_out(&self) {
        let auth = self.auth.clone();
        self.scope.launch(async move { auth.log_out().await });
    }
}

fn toggled(current: &str) -> &'static str {
    if current == DEFAULT_LANGUAGE {
        "en"
    } else {
        DEFAULT_LANGUAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_supported_languages() {
        assert_eq!(toggled("az"), "en");
        assert_eq!(toggled("en"), "az");
        assert_eq!(toggled("ru"), "az");
    }
}
