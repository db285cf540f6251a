//! Casebook server - main entry point.
//!
//! Loads configuration, prepares the database and starts the Actix-web server.

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use casebook_lib::auth::SessionKey;
use casebook_lib::config::Config;
use casebook_lib::db::DbPool;
use casebook_lib::{api, middleware, services};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::other(format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| std::io::Error::other(format!("Failed to set tracing subscriber: {}", e)))?;

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL and CASEBOOK_JWT_SECRET must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Casebook Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = DbPool::new(&config)
        .await
        .map_err(|e| startup_error("Failed to initialize database", e))?;
    info!("Database connection established");

    pool.run_migrations()
        .await
        .map_err(|e| startup_error("Failed to run migrations", e))?;
    info!("Database migrations complete");

    if config.seed_defaults {
        services::seed_defaults(pool.connection())
            .await
            .map_err(|e| startup_error("Failed to seed default data", e))?;
    }

    let bind_address = config.bind_address();
    let session_key = SessionKey::new(config.jwt_secret.clone());
    let finished_statuses = config.finished_statuses.clone();
    let frontend_origin = config.frontend_origin.clone();
    let is_development = config.is_development();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            // CORS must wrap before other middleware
            .wrap(cors)
            .wrap(middleware::RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(session_key.clone()))
            .app_data(web::Data::new(finished_statuses.clone()))
            .service(web::scope("/api/v1").configure(api::configure_routes))
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
