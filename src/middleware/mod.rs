//! Actix-web middleware.

mod request_logger;

pub use request_logger::RequestLogger;
