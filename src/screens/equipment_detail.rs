//! Equipment detail screen
//!
//! There is no single-item endpoint: the record shown here is looked up by id
//! in whatever list the home screen fetched last, and follows that list as it
//! is refreshed.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use super::home::HomeState;
use super::{OperationState, ScreenScope};
use crate::models::{Equipment, EquipmentPage};

#[derive(Debug)]
pub struct EquipmentDetailScreen {
    id: String,
    home: Arc<HomeState>,
    list: watch::Receiver<OperationState<EquipmentPage>>,
    scope: ScreenScope,
}

impl EquipmentDetailScreen {
    pub(crate) fn new(home: Arc<HomeState>, id: &str) -> Self {
        let list = home.list();
        Self {
            id: id.to_string(),
            home,
            list,
            scope: ScreenScope::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The record as of the last fetch, if it is in the list.
    pub fn equipment(&self) -> Option<Equipment> {
        lookup(&self.list.borrow(), &self.id)
    }

    pub fn update_status_state(&self) -> watch::Receiver<OperationState<String>> {
        self.home.update_state()
    }

    pub fn set_status(&self, active: bool) {
        self.home.launch_update(&self.scope, &self.id, active);
    }

    /// Flip active/passive based on the last known status.
    pub fn toggle_status(&self) {
        match self.equipment() {
            Some(equipment) => self.set_status(!equipment.status),
            None => warn!("Cannot toggle {}: not in the current list", self.id),
        }
    }
}

fn lookup(state: &OperationState<EquipmentPage>, id: &str) -> Option<Equipment> {
    match state {
        OperationState::Success(page) => page.find(id).cloned(),
        _ => None,
    }
}
