//! Compile endpoint
//!
//! POST /compile
//! Compiles Dart source to JavaScript or a native executable.

use crate::AppState;
use actix_web::{post, web, HttpResponse, Responder};
use battlecry_common::Result;
use serde_json::Value;

#[post("/compile")]
pub async fn compile(state: web::Data<AppState>, body: web::Json<Value>) -> Result<impl Responder> {
    let request = state.compile_service.validate(&body).map_err(|e| {
        tracing::warn!("Rejected compile request: {}", e);
        e
    })?;

    let target = request.target;
    let outcome = state.compile_service.compile(request).await?;

    Ok(HttpResponse::Ok().json(outcome.into_response(target)))
}
