//! Models Module
//!
//! Wire types exchanged with the Activity Monitor API and the domain
//! entities built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value of the `status` field on a successful response.
pub const STATUS_SUCCESS: &str = "success";

/// Result of a remote operation once normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Error(String),
}

// Domain entities

/// Authenticated user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(rename = "registration")]
    pub registration_date: String,
    #[serde(default)]
    pub is_admin: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub factory: Option<String>,
}

impl User {
    /// Registration date, when it is a valid RFC 3339 timestamp.
    pub fn registered_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(Some(&self.registration_date))
    }

    /// "First Last", falling back to the email address.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }
}

/// A piece of factory equipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<String>,
    /// `true` when active, `false` when passive.
    pub status: bool,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub utilization: Option<f64>,
    pub model: Option<EquipmentModel>,
}

impl Equipment {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created.as_deref())
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.updated.as_deref())
    }

    /// Utilization as a percentage in `[0, 100]`.
    pub fn utilization_percent(&self) -> Option<f64> {
        self.utilization
            .filter(|fraction| fraction.is_finite())
            .map(|fraction| (fraction * 100.0).clamp(0.0, 100.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentModel {
    pub name: Option<String>,
    #[serde(rename = "maintenancePeriod")]
    pub maintenance_interval_days: Option<u32>,
}

/// One page of the equipment list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EquipmentPage {
    pub equipment: Vec<Equipment>,
    pub total: u32,
}

impl EquipmentPage {
    pub fn find(&self, id: &str) -> Option<&Equipment> {
        self.equipment.iter().find(|item| item.id == id)
    }
}

/// Client-side filter over equipment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Passive,
}

impl StatusFilter {
    pub fn matches(self, equipment: &Equipment) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => equipment.status,
            StatusFilter::Passive => !equipment.status,
        }
    }

    pub fn apply(self, equipment: &[Equipment]) -> Vec<Equipment> {
        equipment
            .iter()
            .filter(|item| self.matches(item))
            .cloned()
            .collect()
    }
}

// Request bodies

#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct EquipmentStatusRequest<'a> {
    pub id: &'a str,
    pub status: bool,
}

#[derive(Debug, Serialize)]
pub struct NewEquipmentRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

// Raw response bodies

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpResponse {
    pub status: Option<String>,
    pub success: Option<bool>,
    pub message: Option<String>,
}

impl SignUpResponse {
    pub fn is_success(&self) -> bool {
        self.success == Some(true) || self.status.as_deref() == Some(STATUS_SUCCESS)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInResponse {
    pub status: Option<String>,
    pub data: Option<TokenData>,
    pub message: Option<String>,
}

impl SignInResponse {
    /// The issued token, only when the response reports success.
    pub fn token(&self) -> Option<&str> {
        if self.status.as_deref() != Some(STATUS_SUCCESS) {
            return None;
        }
        self.data
            .as_ref()
            .and_then(|data| data.token.as_deref())
            .filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenData {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeResponse {
    pub status: Option<String>,
    pub data: Option<MeData>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeData {
    pub user: User,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentsResponse {
    pub status: Option<String>,
    pub data: Option<EquipmentsData>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentsData {
    pub total: Option<u32>,
    pub devices: Option<Vec<Equipment>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentStatusResponse {
    pub status: Option<String>,
    /// Present only on rejections.
    pub message: Option<String>,
}

/// Result of adding equipment; errors are carried in `error` rather than raised.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewEquipmentResponse {
    pub status: Option<String>,
    pub data: Option<NewEquipmentData>,
    pub error: Option<String>,
}

impl NewEquipmentResponse {
    /// Synthesized error result for failures that never produced a server body.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: None,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Id of the created equipment when the server confirmed success.
    pub fn created_id(&self) -> Option<&str> {
        if self.status.as_deref() != Some(STATUS_SUCCESS) {
            return None;
        }
        self.data.as_ref().map(|data| data.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewEquipmentData {
    pub id: String,
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lathe(status: bool) -> Equipment {
        Equipment {
            id: format!("lathe-{status}"),
            name: "Lathe".into(),
            description: None,
            owner: None,
            status,
            created: None,
            updated: None,
            utilization: None,
            model: None,
        }
    }

    #[test]
    fn equipment_uses_server_field_names() {
        let raw = json!({
            "_id": "abc123",
            "name": "CNC Mill",
            "description": "5-axis",
            "owner": "u1",
            "status": true,
            "created": "2024-11-02T08:30:00Z",
            "updated": "not a date",
            "utilization": 0.42,
            "__v": 3,
            "model": { "name": "DMU 50", "maintenancePeriod": 90 }
        });

        let equipment: Equipment = serde_json::from_value(raw).unwrap();
        assert_eq!(equipment.id, "abc123");
        assert!(equipment.status);
        assert_eq!(
            equipment.model.as_ref().and_then(|m| m.maintenance_interval_days),
            Some(90)
        );
        assert!(equipment.created_at().is_some());
        assert!(equipment.updated_at().is_none());
        assert_eq!(equipment.utilization_percent(), Some(42.0));
    }

    #[test]
    fn utilization_is_clamped() {
        let mut equipment = lathe(true);
        equipment.utilization = Some(1.7);
        assert_eq!(equipment.utilization_percent(), Some(100.0));
        equipment.utilization = Some(-0.2);
        assert_eq!(equipment.utilization_percent(), Some(0.0));
    }

    #[test]
    fn user_parses_and_names_itself() {
        let raw = json!({
            "_id": "u1",
            "email": "op@factory.az",
            "registration": "2024-01-15T10:00:00.000Z",
            "isAdmin": true,
            "firstName": "Leyla",
            "lastName": null
        });

        let user: User = serde_json::from_value(raw).unwrap();
        assert!(user.is_admin);
        assert_eq!(user.display_name(), "Leyla");
        assert!(user.registered_at().is_some());

        let anonymous = User {
            first_name: None,
            ..user
        };
        assert_eq!(anonymous.display_name(), "op@factory.az");
    }

    #[test]
    fn sign_in_token_requires_success_status() {
        let ok: SignInResponse =
            serde_json::from_value(json!({"status": "success", "data": {"token": "t"}})).unwrap();
        assert_eq!(ok.token(), Some("t"));

        let failed: SignInResponse =
            serde_json::from_value(json!({"status": "error", "data": {"token": "t"}})).unwrap();
        assert_eq!(failed.token(), None);

        let empty: SignInResponse =
            serde_json::from_value(json!({"status": "success", "data": {"token": ""}})).unwrap();
        assert_eq!(empty.token(), None);
    }

    #[test]
    fn sign_up_accepts_either_success_marker() {
        let flag: SignUpResponse = serde_json::from_value(json!({"success": true})).unwrap();
        let status: SignUpResponse = serde_json::from_value(json!({"status": "success"})).unwrap();
        let neither: SignUpResponse = serde_json::from_value(json!({"status": "fail"})).unwrap();

        assert!(flag.is_success());
        assert!(status.is_success());
        assert!(!neither.is_success());
    }

    #[test]
    fn status_filter_partitions_list() {
        let list = vec![lathe(true), lathe(false)];

        assert_eq!(StatusFilter::All.apply(&list).len(), 2);
        assert_eq!(StatusFilter::Active.apply(&list), vec![lathe(true)]);
        assert_eq!(StatusFilter::Passive.apply(&list), vec![lathe(false)]);
    }

    #[test]
    fn new_equipment_created_id() {
        let created: NewEquipmentResponse =
            serde_json::from_value(json!({"status": "success", "data": {"id": "n1"}})).unwrap();
        assert_eq!(created.created_id(), Some("n1"));

        let failed = NewEquipmentResponse::failed("boom");
        assert_eq!(failed.created_id(), None);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
