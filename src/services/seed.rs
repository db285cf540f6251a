//! Startup seeding of statuses, permissions and roles.
//!
//! Each table is seeded only while it is empty, so running the seed against
//! an initialized database changes nothing.

use std::collections::HashMap;

use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use tracing::info;

use crate::db;
use crate::error::{AppError, AppResult};

const DEFAULTS: &str = include_str!("seed/defaults.json");

#[derive(Debug, Deserialize)]
struct SeedData {
    statuses: Vec<SeedStatus>,
    permissions: Vec<String>,
    roles: Vec<SeedRole>,
}

#[derive(Debug, Deserialize)]
struct SeedStatus {
    name: String,
    color: String,
    #[serde(default)]
    is_default: bool,
}

#[derive(Debug, Deserialize)]
struct SeedRole {
    name: String,
    permissions: Vec<String>,
}

/// Rows inserted by a seed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub statuses: usize,
    pub permissions: usize,
    pub roles: usize,
}

fn load_defaults() -> AppResult<SeedData> {
    let data: SeedData = serde_json::from_str(DEFAULTS)?;

    let defaults = data.statuses.iter().filter(|s| s.is_default).count();
    if defaults != 1 {
        return Err(AppError::InvalidInput(format!(
            "Seed data flags {} statuses as default, expected exactly one",
            defaults
        )));
    }

    Ok(data)
}

/// Insert the built-in statuses, permissions and roles into empty tables.
pub async fn seed_defaults(db: &DatabaseConnection) -> AppResult<SeedReport> {
    let data = load_defaults()?;
    let mut report = SeedReport::default();

    let txn = db.begin().await?;

    if db::statuses::count(&txn).await? == 0 {
        for status in &data.statuses {
            db::statuses::insert(&txn, &status.name, &status.color, status.is_default).await?;
        }
        report.statuses = data.statuses.len();
    }

    if db::users::count_permissions(&txn).await? == 0 {
        for name in &data.permissions {
            db::users::insert_permission(&txn, name).await?;
        }
        report.permissions = data.permissions.len();
    }

    if db::users::count_roles(&txn).await? == 0 {
        let mut permission_ids: HashMap<&str, i32> = HashMap::new();
        for name in &data.permissions {
            if let Some(p) = db::users::find_permission_by_name(&txn, name).await? {
                permission_ids.insert(name.as_str(), p.id);
            }
        }

        for seed_role in &data.roles {
            let role = db::users::insert_role(&txn, &seed_role.name).await?;
            for name in &seed_role.permissions {
                let permission_id = permission_ids.get(name.as_str()).ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "Role '{}' references unknown permission '{}'",
                        seed_role.name, name
                    ))
                })?;
                db::users::grant(&txn, role.id, *permission_id).await?;
            }
        }
        report.roles = data.roles.len();
    }

    txn.commit().await?;

    info!(
        statuses = report.statuses,
        permissions = report.permissions,
        roles = report.roles,
        "Default data seeded"
    );

    Ok(report)
}
