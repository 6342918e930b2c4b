//! POS wire types
//!
//! JSON fields are camelCase; `type` and `campus` travel as their symbolic
//! names (`"VENDING_MACHINE"`, `"INF"`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{DomainError, DomainResult, NewPos, PointOfSale, PosId, PosPatch};

/// Point of sale as returned by every read and write endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PosResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "CAFE")]
    pub pos_type: String,
    #[schema(example = "ALTSTADT")]
    pub campus: String,
    pub street: String,
    pub house_number: String,
    pub postal_code: u32,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PointOfSale> for PosResponse {
    fn from(p: PointOfSale) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            pos_type: p.pos_type.to_string(),
            campus: p.campus.to_string(),
            street: p.street,
            house_number: p.house_number,
            postal_code: p.postal_code,
            city: p.city,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// New point of sale. The server assigns `id` and both timestamps.
///
/// Business fields are optional at the JSON level so a missing one is
/// reported as a 422 naming the field instead of a generic parse error.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePosRequest {
    /// Must be absent; ids are assigned by the server
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    #[schema(required = true)]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "description is too long"))]
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "CAFE", required = true)]
    pub pos_type: Option<String>,
    #[schema(example = "ALTSTADT", required = true)]
    pub campus: Option<String>,
    #[schema(required = true)]
    pub street: Option<String>,
    #[schema(required = true)]
    pub house_number: Option<String>,
    #[schema(required = true)]
    pub postal_code: Option<i64>,
    #[schema(required = true)]
    pub city: Option<String>,
}

impl CreatePosRequest {
    pub fn into_new_pos(self) -> DomainResult<NewPos> {
        if self.id.is_some() {
            return Err(DomainError::validation(
                "id",
                "must not be set when creating a POS",
            ));
        }
        Ok(NewPos {
            name: required("name", self.name)?,
            description: self.description,
            pos_type: required("type", self.pos_type)?,
            campus: required("campus", self.campus)?,
            street: required("street", self.street)?,
            house_number: required("houseNumber", self.house_number)?,
            postal_code: required("postalCode", self.postal_code)?,
            city: required("city", self.city)?,
        })
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> DomainResult<T> {
    value.ok_or_else(|| DomainError::validation(field, "is required"))
}

/// Partial update: absent fields keep their stored value.
///
/// `description: null` clears the description. `createdAt`/`updatedAt` are
/// server-owned and ignored when sent.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePosRequest {
    /// Optional; when present it must equal the id in the path
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(rename = "type")]
    pub pos_type: Option<String>,
    pub campus: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub postal_code: Option<i64>,
    pub city: Option<String>,
}

impl UpdatePosRequest {
    pub fn into_patch(self, path_id: PosId) -> DomainResult<PosPatch> {
        if let Some(body_id) = self.id {
            if body_id != path_id {
                return Err(DomainError::validation(
                    "id",
                    format!("body id {} does not match path id {}", body_id, path_id),
                ));
            }
        }
        Ok(PosPatch {
            name: self.name,
            description: self.description,
            pos_type: self.pos_type,
            campus: self.campus,
            street: self.street,
            house_number: self.house_number,
            postal_code: self.postal_code,
            city: self.city,
        })
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field
/// (`None`, via `#[serde(default)]`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CampusType, PosType};

    #[test]
    fn response_uses_wire_names() {
        let now = crate::shared::time::now_micros();
        let pos = PointOfSale {
            id: 3,
            name: "Snack Corner".into(),
            description: None,
            pos_type: PosType::VendingMachine,
            campus: CampusType::Inf,
            street: "Im Neuenheimer Feld".into(),
            house_number: "205".into(),
            postal_code: 69120,
            city: "Heidelberg".into(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(PosResponse::from(pos)).unwrap();
        assert_eq!(json["type"], "VENDING_MACHINE");
        assert_eq!(json["campus"], "INF");
        assert_eq!(json["houseNumber"], "205");
        assert_eq!(json["postalCode"], 69120);
        assert!(json["description"].is_null());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn create_with_id_is_rejected() {
        let req: CreatePosRequest = serde_json::from_value(serde_json::json!({
            "id": 9,
            "name": "Café",
            "type": "CAFE",
            "campus": "ALTSTADT",
            "street": "Hauptstraße",
            "houseNumber": "1",
            "postalCode": 69117,
            "city": "Heidelberg"
        }))
        .unwrap();

        let err = req.into_new_pos().unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "id", .. }));
    }

    #[test]
    fn update_description_is_tri_state() {
        let absent: UpdatePosRequest = serde_json::from_str(r#"{"city": "Mannheim"}"#).unwrap();
        assert_eq!(absent.description, None);

        let cleared: UpdatePosRequest = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: UpdatePosRequest = serde_json::from_str(r#"{"description": "Open late"}"#).unwrap();
        assert_eq!(set.description, Some(Some("Open late".to_string())));
    }

    #[test]
    fn update_ignores_server_timestamps() {
        let req: UpdatePosRequest = serde_json::from_str(
            r#"{"createdAt": "2000-01-01T00:00:00Z", "updatedAt": "2000-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let patch = req.into_patch(1).unwrap();
        assert_eq!(patch, PosPatch::default());
    }

    #[test]
    fn update_id_must_match_path() {
        let same: UpdatePosRequest = serde_json::from_str(r#"{"id": 4}"#).unwrap();
        assert!(same.into_patch(4).is_ok());

        let other: UpdatePosRequest = serde_json::from_str(r#"{"id": 5}"#).unwrap();
        let err = other.into_patch(4).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "id", .. }));
    }

    #[test]
    fn create_names_first_missing_field() {
        let req: CreatePosRequest = serde_json::from_value(serde_json::json!({
            "name": "Café",
            "type": "CAFE",
            "campus": "ALTSTADT",
            "street": "Hauptstraße",
            "postalCode": 69117,
            "city": null
        }))
        .unwrap();

        let err = req.into_new_pos().unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "houseNumber", .. }));
    }
}
