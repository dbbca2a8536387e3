//! Virtual file tree endpoints
//!
//! GET    /api/files?path=<dir>   direct children of a directory
//! GET    /api/files/{path}       read one entry
//! POST   /api/files              create a file
//! PUT    /api/files/{path}       update content and/or permissions
//! DELETE /api/files/{path}       delete one entry
//! POST   /api/directories        create a directory

use crate::AppState;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use battlecry_common::types::{
    CreateDirectoryRequest, CreateFileRequest, FileKind, ListFilesQuery, NewFileEntry,
    UpdateFileRequest,
};
use battlecry_common::{BattlecryError, Result};
use serde_json::json;
use validator::Validate;

fn not_found() -> BattlecryError {
    BattlecryError::NotFound("File not found".to_string())
}

fn path_required() -> BattlecryError {
    BattlecryError::InvalidRequest("Path is required".to_string())
}

/// Tail segments of `/api/files/{path}` name an absolute path
fn absolute(tail: &str) -> String {
    format!("/{}", tail)
}

#[get("/api/files")]
pub async fn list_files(
    state: web::Data<AppState>,
    query: web::Query<ListFilesQuery>,
) -> Result<impl Responder> {
    let dir = query
        .path
        .as_deref()
        .filter(|path| !path.is_empty())
        .unwrap_or("/");

    let files = state.file_store.list_children(dir).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "files": files,
    })))
}

#[get("/api/files/{path:.*}")]
pub async fn read_file(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder> {
    let path = absolute(&path);
    let file = state.file_store.get(&path).await?.ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "file": file,
    })))
}

#[post("/api/files")]
pub async fn create_file(
    state: web::Data<AppState>,
    body: web::Json<CreateFileRequest>,
) -> Result<impl Responder> {
    body.validate().map_err(|_| path_required())?;

    let file = state
        .file_store
        .insert(NewFileEntry::from(body.into_inner()))
        .await?;
    tracing::info!(path = %file.path, kind = %file.kind, "File created");

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "file": file,
    })))
}

#[put("/api/files/{path:.*}")]
pub async fn update_file(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateFileRequest>,
) -> Result<impl Responder> {
    let path = absolute(&path);
    let file = state
        .file_store
        .update(&path, body.into_inner())
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "file": file,
    })))
}

#[delete("/api/files/{path:.*}")]
pub async fn delete_file(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder> {
    let path = absolute(&path);
    if !state.file_store.delete(&path).await? {
        return Err(not_found());
    }
    tracing::info!(path = %path, "File deleted");

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "File deleted",
    })))
}

#[post("/api/directories")]
pub async fn create_directory(
    state: web::Data<AppState>,
    body: web::Json<CreateDirectoryRequest>,
) -> Result<impl Responder> {
    body.validate().map_err(|_| path_required())?;
    let path = body.into_inner().path;

    if let Some(existing) = state.file_store.get(&path).await? {
        if existing.kind == FileKind::Directory.as_str() {
            return Err(BattlecryError::Conflict("Directory already exists".to_string()));
        }
    }

    let directory = state.file_store.insert(NewFileEntry::directory(path)).await?;
    tracing::info!(path = %directory.path, "Directory created");

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "directory": directory,
    })))
}
