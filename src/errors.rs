use actix_web::HttpResponse;
use thiserror::Error;

use crate::auth::token::AuthError;
use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("No items could be booked")]
    NothingBooked,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound,
            DomainError::Forbidden(msg) => AppError::Forbidden(msg),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::NothingBooked => AppError::NothingBooked,
            DomainError::InvalidInput(msg) => AppError::Validation(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken => AppError::InvalidToken,
            AuthError::Key(msg) | AuthError::Signing(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = serde_json::json!({ "error": self.to_string() });
        match self {
            AppError::NotFound => HttpResponse::NotFound().json(body),
            AppError::Forbidden(_) => HttpResponse::Forbidden().json(body),
            AppError::Conflict(_) | AppError::NothingBooked => {
                HttpResponse::Conflict().json(body)
            }
            AppError::InvalidToken => HttpResponse::Unauthorized()
                .insert_header(("WWW-Authenticate", "Bearer"))
                .json(body),
            AppError::Validation(_) => HttpResponse::UnprocessableEntity().json(body),
            AppError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Internal server error"
                }))
            }
        }
    }
}
