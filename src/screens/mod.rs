//! Screen state holders
//!
//! One holder per screen. Each sequences calls into the session and
//! equipment layers and republishes the results as observable state.
//! Work runs on the holder's own task scope and is cancelled when the
//! holder is dropped.

pub mod equipment_detail;
pub mod home;
pub mod profile;
pub mod sign_in;
pub mod sign_up;
pub mod splash;

use std::future::Future;
use std::sync::Mutex;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::debug;

pub use equipment_detail::EquipmentDetailScreen;
pub use home::HomeScreen;
pub use profile::ProfileScreen;
pub use sign_in::SignInScreen;
pub use sign_up::SignUpScreen;
pub use splash::SplashScreen;

/// State of a user-triggered operation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OperationState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> OperationState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, OperationState::Loading)
    }

    /// `true` once the operation has succeeded or failed.
    pub fn is_settled(&self) -> bool {
        matches!(self, OperationState::Success(_) | OperationState::Error(_))
    }
}

/// Move `state` to `Loading` unless an operation is already in flight.
///
/// Returns `false` when the trigger should be ignored.
pub(crate) fn begin<T>(state: &watch::Sender<OperationState<T>>) -> bool {
    let started = state.send_if_modified(|current| {
        if current.is_loading() {
            false
        } else {
            *current = OperationState::Loading;
            true
        }
    });

    if !started {
        debug!("Ignoring trigger while operation is in flight");
    }
    started
}

/// Tasks tied to a screen's visible lifetime
#[derive(Debug, Default)]
pub struct ScreenScope {
    tasks: Mutex<JoinSet<()>>,
}

impl ScreenScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` until it completes or the scope is dropped.
    pub fn launch<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(mut tasks) = self.tasks.lock() {
            while tasks.try_join_next().is_some() {}
            tasks.spawn(work);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn begin_guards_against_double_submit() {
        let (state, _rx) = watch::channel(OperationState::<()>::Idle);

        assert!(begin(&state));
        assert!(!begin(&state));

        state.send_replace(OperationState::Error("x".into()));
        assert!(begin(&state));
    }

    #[tokio::test]
    async fn dropping_scope_cancels_work() {
        let (tx, mut rx) = watch::channel(false);
        let scope = ScreenScope::new();

        scope.launch(async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            tx.send_replace(true);
        });
        drop(scope);

        // The sender is dropped with the aborted task, so the channel closes unchanged.
        assert!(rx.changed().await.is_err());
        assert!(!*rx.borrow());
    }
}
