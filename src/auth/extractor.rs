use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::TokenVerifier;
use crate::domain::identity::Identity;
use crate::errors::AppError;

/// Extractor that verifies the `Authorization: Bearer <token>` header before
/// the handler body runs. A missing or invalid token short-circuits to 401
/// without touching any business logic.
pub struct BearerIdentity(pub Identity);

impl FromRequest for BearerIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

fn extract(req: &HttpRequest) -> Result<BearerIdentity, AppError> {
    let verifier = req
        .app_data::<web::Data<TokenVerifier>>()
        .ok_or_else(|| AppError::Internal("token verifier not configured".to_string()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidToken)?;

    let identity = verifier.verify(token)?;
    Ok(BearerIdentity(identity))
}
