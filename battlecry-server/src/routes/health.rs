//! Health check endpoint

use crate::AppState;
use actix_web::{get, web, HttpResponse, Responder};
use battlecry_common::types::HealthResponse;

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let available = state.compile_service.probe_toolchain().await;
    HttpResponse::Ok().json(HealthResponse::from_probe(available))
}
