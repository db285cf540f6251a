//! API endpoint modules.

pub mod catalog;
pub mod health;
pub mod members;
pub mod openapi;
pub mod plans;
pub mod runs;
pub mod statuses;

use actix_web::web;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;

/// Mount every `/api/v1` route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(openapi::configure_routes)
        .configure(catalog::configure_routes)
        .configure(plans::configure_routes)
        .configure(runs::configure_routes)
        .configure(statuses::configure_routes)
        .configure(members::configure_routes);
}
