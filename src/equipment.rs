//! Equipment Module
//!
//! List, create, and toggle equipment through the API client.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{EquipmentPage, NewEquipmentResponse, Outcome, STATUS_SUCCESS};

pub const LIST_UNKNOWN_ERROR: &str = "Unknown error occurred";
pub const LIST_UNEXPECTED_ERROR: &str = "An unexpected error occurred";
pub const UPDATE_REJECTED: &str = "Failed to update equipment status.";
pub const EMPTY_BODY: &str = "Empty response body";

/// Failure raised by [`EquipmentRepository::update_status`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatusUpdateError {
    #[error("Network Error: {0}")]
    Network(String),

    #[error("Error {code}: {reason}")]
    Http { code: u16, reason: String },

    #[error("{0}")]
    Rejected(String),
}

/// Equipment access over the API client
#[derive(Debug, Clone)]
pub struct EquipmentRepository {
    api: Arc<ApiClient>,
}

impl EquipmentRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Fetch one page of equipment.
    pub async fn fetch(&self, page_size: u32, page_num: u32) -> Outcome<EquipmentPage> {
        let response = match self.api.list_devices(page_size, page_num).await {
            Ok(response) => response,
            Err(e) => {
                error!("Equipment list failed: {}", e);
                let detail = e.detail();
                let message = if detail.is_empty() {
                    LIST_UNEXPECTED_ERROR.to_string()
                } else {
                    detail.to_string()
                };
                return Outcome::Error(message);
            }
        };

        if !response.is_success() {
            warn!("Equipment list returned {}", response.status);
            let status_line = response.status_line();
            return Outcome::Error(response.error_body.unwrap_or(status_line));
        }

        let body = response.body.unwrap_or_default();
        match (body.status.as_deref(), body.data, body.error) {
            (Some(STATUS_SUCCESS), Some(data), _) => {
                let page = EquipmentPage {
                    equipment: data.devices.unwrap_or_default(),
                    total: data.total.unwrap_or(0),
                };
                info!("Fetched {} of {} equipment", page.equipment.len(), page.total);
                Outcome::Success(page)
            }
            (_, _, Some(message)) => Outcome::Error(message),
            _ => Outcome::Error(LIST_UNKNOWN_ERROR.into()),
        }
    }

    /// Set an equipment's active/passive status.
    ///
    /// Succeeds only when the server confirms with `status == "success"`.
    pub async fn update_status(&self, id: &str, status: bool) -> Result<(), StatusUpdateError> {
        info!("Updating equipment {} to {}", id, if status { "active" } else { "passive" });

        let response = self
            .api
            .update_device(id, status)
            .await
            .map_err(|e| match e {
                ApiError::Network(detail) => StatusUpdateError::Network(detail),
                other => StatusUpdateError::Rejected(format!("Error: {}", other.detail())),
            })?;

        if !response.is_success() {
            return Err(StatusUpdateError::Http {
                code: response.status.as_u16(),
                reason: response
                    .status
                    .canonical_reason()
                    .unwrap_or_default()
                    .to_string(),
            });
        }

        let body = response.body.unwrap_or_default();
        if body.status.as_deref() != Some(STATUS_SUCCESS) {
            let message = body.message.unwrap_or_else(|| UPDATE_REJECTED.to_string());
            warn!("Status update rejected: {}", message);
            return Err(StatusUpdateError::Rejected(message));
        }

        Ok(())
    }

    /// Create equipment. Failures are folded into the returned value.
    pub async fn add(&self, name: &str, description: &str) -> NewEquipmentResponse {
        info!("Adding equipment: {}", name);

        match self.api.add_device(name, description).await {
            Ok(response) if response.is_success() => response
                .body
                .unwrap_or_else(|| NewEquipmentResponse::failed(EMPTY_BODY)),
            Ok(response) => {
                warn!("Add equipment returned {}", response.status);
                let status_line = response.status_line();
                NewEquipmentResponse::failed(response.error_body.unwrap_or(status_line))
            }
            Err(ApiError::Network(detail)) => {
                NewEquipmentResponse::failed(format!("Network Error: {}", detail))
            }
            Err(e) => NewEquipmentResponse::failed(format!("Error: {}", e.detail())),
        }
    }
}
