//! HTTP routes

pub mod compile;
pub mod files;
pub mod health;

use actix_web::{error::JsonPayloadError, web, HttpRequest};
use battlecry_common::BattlecryError;

/// Largest accepted JSON request body
pub const JSON_BODY_LIMIT: usize = 1024 * 1024;

/// Register every route on an app or scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(compile::compile)
        .service(health::health_check)
        .service(files::list_files)
        .service(files::create_file)
        .service(files::create_directory)
        .service(files::read_file)
        .service(files::update_file)
        .service(files::delete_file);
}

/// JSON extractor settings shared by all routes
///
/// Malformed or oversized bodies are reported in the same
/// `{ success: false, error }` shape as validation failures.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(json_error)
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::warn!("Rejected request body: {}", err);
    BattlecryError::InvalidRequest(format!("Invalid JSON body: {}", err)).into()
}
