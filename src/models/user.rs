//! User and member payloads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::user;

/// Account status. Inactive users are rejected at the authorization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum UserStatus {
    Active,
    InActive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::InActive => "InActive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Active" => Some(Self::Active),
            "InActive" => Some(Self::InActive),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User reference embedded in other payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserRef {
    pub id: i32,
    pub name: String,
}

impl From<&user::Model> for UserRef {
    fn from(m: &user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
        }
    }
}

/// Member record.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub language: String,
    pub role_id: Option<i32>,
}

/// Request to update a member. `status` and `role_id` require the admin permission.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateMemberRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub status: Option<UserStatus>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<i32>)]
    pub role_id: Option<Option<i32>>,
}
