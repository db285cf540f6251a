//! Casebook server library.
//!
//! Test case catalogs, test plans and test runs: storage, the core services
//! that operate on them, and the HTTP surface exposing those services.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
