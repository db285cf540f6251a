//! Status payloads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::status;

/// Status reference embedded in run views.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct StatusRef {
    pub id: i32,
    pub name: String,
    pub color: String,
}

impl From<&status::Model> for StatusRef {
    fn from(m: &status::Model) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            color: m.color.clone(),
        }
    }
}

/// Status row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusView {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub is_default: bool,
}

impl From<status::Model> for StatusView {
    fn from(m: status::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            color: m.color,
            is_default: m.is_default,
        }
    }
}

/// All statuses plus the default one.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusListResponse {
    pub entities: Vec<StatusView>,
    pub default_id: Option<i32>,
}

/// Request to create a status. Creating it as default clears the previous default.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateStatusRequest {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Request to update a status.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Only `true` is accepted; the default moves by promoting another status.
    #[serde(default)]
    pub is_default: Option<bool>,
}
