//! Business logic services.
//!
//! Services take a connection (or open a transaction on it) and return typed
//! [`crate::error::AppResult`]s; handlers stay thin.

pub mod catalog;
pub mod members;
pub mod permissions;
pub mod plan_charts;
pub mod plans;
pub mod run_cases;
pub mod run_freeze;
pub mod run_sync;
pub mod run_view;
pub mod seed;
pub mod statuses;
pub mod suite_tree;

pub use permissions::{authorize, Subject, ADMIN, EDIT};
pub use seed::seed_defaults;
