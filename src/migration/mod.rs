//! SeaORM database migrations.
//!
//! Written with the portable schema DSL so the same migrator runs against
//! PostgreSQL and SQLite.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_projects;
mod m20260301_000002_create_access_control;
mod m20260301_000003_create_statuses;
mod m20260301_000004_create_catalog;
mod m20260301_000005_create_runs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_projects::Migration),
            Box::new(m20260301_000002_create_access_control::Migration),
            Box::new(m20260301_000003_create_statuses::Migration),
            Box::new(m20260301_000004_create_catalog::Migration),
            Box::new(m20260301_000005_create_runs::Migration),
        ]
    }
}
