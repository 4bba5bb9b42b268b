//! Home screen: the equipment list and the mutations launched from it.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info};

use super::{begin, EquipmentDetailScreen, OperationState, ScreenScope};
use crate::equipment::EquipmentRepository;
use crate::models::{Equipment, EquipmentPage, Outcome, StatusFilter};

/// Page size requested by the list screen.
pub const PAGE_SIZE: u32 = 50;

/// The list screen only ever requests the first page.
pub const FIRST_PAGE: u32 = 1;

pub const STATUS_UPDATED: &str = "Status updated successfully.";
pub const ADD_UNKNOWN_ERROR: &str = "Unknown error occurred.";

/// State shared between the home screen and screens opened from it.
#[derive(Debug)]
pub(crate) struct HomeState {
    equipment: EquipmentRepository,
    list: watch::Sender<OperationState<EquipmentPage>>,
    error_message: watch::Sender<Option<String>>,
    update_status: watch::Sender<OperationState<String>>,
    add_equipment: watch::Sender<OperationState<String>>,
}

impl HomeState {
    async fn refresh(&self) {
        self.list.send_if_modified(|current| {
            if matches!(current, OperationState::Success(_)) {
                false
            } else {
                *current = OperationState::Loading;
                true
            }
        });

        match self.equipment.fetch(PAGE_SIZE, FIRST_PAGE).await {
            Outcome::Success(page) => {
                debug!("Fetched equipments: {}", page.equipment.len());
                self.list.send_replace(OperationState::Success(page));
            }
            Outcome::Error(message) => {
                error!("Error fetching equipments: {}", message);
                self.error_message.send_replace(Some(message.clone()));
                self.list.send_replace(OperationState::Error(message));
            }
        }
    }

    pub(crate) fn list(&self) -> watch::Receiver<OperationState<EquipmentPage>> {
        self.list.subscribe()
    }

    pub(crate) fn update_state(&self) -> watch::Receiver<OperationState<String>> {
        self.update_status.subscribe()
    }

    /// Launch a status update on `scope`, refreshing the list on success.
    ///
    /// `scope` may belong to a screen that closes before the update settles;
    /// the shared state is then returned to `Idle` so later triggers go through.
    pub(crate) fn launch_update(self: &Arc<Self>, scope: &ScreenScope, id: &str, status: bool) {
        let Some(in_flight) = InFlight::start(self, HomeState::update_slot) else {
            return;
        };

        let shared = self.clone();
        let id = id.to_string();

        scope.launch(async move {
            match shared.equipment.update_status(&id, status).await {
                Ok(()) => {
                    info!("Equipment {} status confirmed", id);
                    in_flight.settle(OperationState::Success(STATUS_UPDATED.into()));
                    shared.refresh().await;
                }
                Err(e) => in_flight.settle(OperationState::Error(e.to_string())),
            }
        });
    }

    fn update_slot(&self) -> &watch::Sender<OperationState<String>> {
        &self.update_status
    }

    fn add_slot(&self) -> &watch::Sender<OperationState<String>> {
        &self.add_equipment
    }
}

type Slot = fn(&HomeState) -> &watch::Sender<OperationState<String>>;

/// A running home action. Dropping it while the action is still `Loading`
/// resets the action to `Idle`.
struct InFlight {
    home: Arc<HomeState>,
    slot: Slot,
}

impl InFlight {
    fn start(home: &Arc<HomeState>, slot: Slot) -> Option<Self> {
        begin(slot(home)).then(|| Self {
            home: home.clone(),
            slot,
        })
    }

    fn settle(&self, next: OperationState<String>) {
        (self.slot)(&self.home).send_replace(next);
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let abandoned = (self.slot)(&self.home).send_if_modified(|current| {
            if current.is_loading() {
                *current = OperationState::Idle;
                true
            } else {
                false
            }
        });

        if abandoned {
            debug!("Action cancelled before it settled");
        }
    }
}

/// Home screen state holder
#[derive(Debug)]
pub struct HomeScreen {
    shared: Arc<HomeState>,
    scope: ScreenScope,
}

impl HomeScreen {
    pub fn new(equipment: EquipmentRepository) -> Self {
        let shared = HomeState {
            equipment,
            list: watch::channel(OperationState::Idle).0,
            error_message: watch::channel(None).0,
            update_status: watch::channel(OperationState::Idle).0,
            add_equipment: watch::channel(OperationState::Idle).0,
        };

        Self {
            shared: Arc::new(shared),
            scope: ScreenScope::new(),
        }
    }

    /// Called when the screen becomes visible.
    pub fn on_enter(&self) {
        self.fetch_equipments();
    }

    pub fn fetch_equipments(&self) {
        let shared = self.shared.clone();
        self.scope.launch(async move { shared.refresh().await });
    }

    pub fn equipment_list(&self) -> watch::Receiver<OperationState<EquipmentPage>> {
        self.shared.list()
    }

    /// Last fetched equipment matching `filter`; empty when nothing has loaded.
    pub fn filtered(&self, filter: StatusFilter) -> Vec<Equipment> {
        match &*self.shared.list.borrow() {
            OperationState::Success(page) => filter.apply(&page.equipment),
            _ => Vec::new(),
        }
    }

    pub fn error_message(&self) -> watch::Receiver<Option<String>> {
        self.shared.error_message.subscribe()
    }

    pub fn update_status_state(&self) -> watch::Receiver<OperationState<String>> {
        self.shared.update_state()
    }

    pub fn add_equipment_state(&self) -> watch::Receiver<OperationState<String>> {
        self.shared.add_equipment.subscribe()
    }

    pub fn update_equipment_status(&self, id: &str, status: bool) {
        self.shared.launch_update(&self.scope, id, status);
    }

    /// Create equipment, refreshing the list once the server assigns an id.
    pub fn add_equipment(&self, name: &str, description: &str) {
        let Some(in_flight) = InFlight::start(&self.shared, HomeState::add_slot) else {
            return;
        };

        let shared = self.shared.clone();
        let name = name.trim().to_string();
        let description = description.trim().to_string();

        self.scope.launch(async move {
            let response = shared.equipment.add(&name, &description).await;

            let created_id = response.created_id().map(str::to_string);
            let next = match (created_id, response.error) {
                (Some(id), _) => OperationState::Success(id),
                (None, Some(message)) => OperationState::Error(message),
                (None, None) => OperationState::Error(ADD_UNKNOWN_ERROR.into()),
            };
            let created = matches!(next, OperationState::Success(_));
            in_flight.settle(next);

            if created {
                shared.refresh().await;
            }
        });
    }

    pub fn reset_add_equipment_state(&self) {
        self.shared.add_equipment.send_replace(OperationState::Idle);
    }

    pub fn reset_update_status_state(&self) {
        self.shared.update_status.send_replace(OperationState::Idle);
    }

    /// Open the detail view for one equipment item.
    pub fn detail(&self, id: &str) -> EquipmentDetailScreen {
        EquipmentDetailScreen::new(self.shared.clone(), id)
    }
}
