//! Database module providing connection management, migrations, and the
//! query/command primitives used by the services.
//!
//! Query functions are generic over [`ConnectionTrait`] so the same primitive
//! runs on the pooled connection or inside a [`sea_orm::DatabaseTransaction`].

pub mod cases;
pub mod comments;
pub mod milestones;
pub mod plans;
pub mod projects;
pub mod run_cases;
pub mod runs;
pub mod statuses;
pub mod suites;
pub mod users;

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::{Config, DatabaseSettings};
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

/// Database connection pool wrapper.
///
/// `DatabaseConnection` is internally pooled and cheap to clone.
#[derive(Clone, Debug)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration.
    pub async fn new(config: &Config) -> AppResult<Self> {
        Self::connect(&config.database).await
    }

    /// Connect using explicit database settings.
    pub async fn connect(settings: &DatabaseSettings) -> AppResult<Self> {
        let mut options = ConnectOptions::new(settings.url.clone());
        options
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        info!(
            max_connections = settings.max_connections,
            backend = ?conn.get_database_backend(),
            "Database pool created"
        );

        Ok(DbPool { conn })
    }

    /// Get the underlying connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Apply all pending migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Failed to run migrations: {}", e)))
    }
}
