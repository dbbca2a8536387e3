//! Error types for the Battlecry editor backend

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BattlecryError>;

#[derive(Debug, Error)]
pub enum BattlecryError {
    /// Rejected before any resource was allocated
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Scratch file or output directory could not be created
    #[error("Server error: {0}")]
    WorkspaceError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl actix_web::error::ResponseError for BattlecryError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::build(self.status_code()).json(
            serde_json::json!({
                "success": false,
                "error": self.to_string(),
            }),
        )
    }
}
