//! Core integration tests.
//!
//! Every test runs against its own in-memory SQLite database, migrated with
//! the real migrator and seeded with the default statuses and roles.
//!
//! Run with: cargo test --test core

mod test_helpers;

mod test_http;
mod test_members;
mod test_migrations;
mod test_permissions;
mod test_plans;
mod test_run_cases;
mod test_run_freeze;
mod test_run_sync;
mod test_statuses;
