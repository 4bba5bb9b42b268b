//! Splash screen: decides between the sign-in and home routes.

use std::sync::Arc;

use tokio::sync::watch;

use super::ScreenScope;
use crate::auth::AuthManager;

#[derive(Debug)]
pub struct SplashScreen {
    logged_in: Arc<watch::Sender<bool>>,
    _scope: ScreenScope,
}

impl SplashScreen {
    pub fn new(auth: &AuthManager) -> Self {
        let mut token = auth.token();
        let logged_in = Arc::new(watch::channel(token.borrow().is_some()).0);
        let scope = ScreenScope::new();

        let publisher = logged_in.clone();
        scope.launch(async move {
            loop {
                let present = token.borrow_and_update().is_some();
                publisher.send_if_modified(|current| std::mem::replace(current, present) != present);
                if token.changed().await.is_err() {
                    break;
                }
            }
        });

        Self {
            logged_in,
            _scope: scope,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        *self.logged_in.borrow()
    }

    pub fn logged_in(&self) -> watch::Receiver<bool> {
        self.logged_in.subscribe()
    }
}
