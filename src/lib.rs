//! Activity Monitor Client Library
//!
//! Session, preference and equipment plumbing for the Activity Monitor
//! client, plus UI-agnostic state holders for each screen.

pub mod api;
pub mod auth;
pub mod config;
pub mod equipment;
pub mod filter;
pub mod logging;
pub mod models;
pub mod screens;
pub mod storage;

use std::sync::Arc;

use api::{ApiClient, ApiError};
use auth::AuthManager;
use config::Config;
use equipment::EquipmentRepository;
use filter::TokenInjector;
use storage::{PreferenceStore, StorageError};

/// Application state shared across screens
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub preferences: Arc<PreferenceStore>,
    pub api: Arc<ApiClient>,
    pub auth: Arc<AuthManager>,
    pub equipment: EquipmentRepository,
}

impl AppState {
    /// Wire the stack together. Must be called from within a Tokio runtime.
    pub fn new(config: Config) -> Result<Self, InitError> {
        let preferences = Arc::new(PreferenceStore::open(&config.data_dir)?);
        let filter = TokenInjector::new(preferences.clone());
        let api = Arc::new(ApiClient::new(&config, Box::new(filter))?);
        let auth = Arc::new(AuthManager::new(api.clone(), preferences.clone()));
        let equipment = EquipmentRepository::new(api.clone());

        Ok(Self {
            config,
            preferences,
            api,
            auth,
            equipment,
        })
    }

    pub fn splash_screen(&self) -> screens::SplashScreen {
        screens::SplashScreen::new(&self.auth)
    }

    pub fn sign_in_screen(&self) -> screens::SignInScreen {
        screens::SignInScreen::new(self.auth.clone())
    }

    pub fn sign_up_screen(&self) -> screens::SignUpScreen {
        screens::SignUpScreen::new(self.auth.clone())
    }

    pub fn home_screen(&self) -> screens::HomeScreen {
        screens::HomeScreen::new(self.equipment.clone())
    }

    pub fn profile_screen(&self) -> screens::ProfileScreen {
        screens::ProfileScreen::new(self.auth.clone(), self.preferences.clone())
    }
}

/// Startup errors
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
