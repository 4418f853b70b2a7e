//! Bearer token extractors
//!
//! Put `AuthUser`/`AdminUser` first in a handler's arguments so the token is
//! checked before any body (multipart included) is read.

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::error::ApiError;
use crate::models::UserRole;
use crate::state::AppState;
use crate::utils::auth::verify_jwt;

/// Caller identity taken from a verified access token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub role: UserRole,
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// An `AuthUser` whose role is admin
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequest for AdminUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|user| {
            if user.role == UserRole::Admin {
                Ok(AdminUser(user))
            } else {
                Err(ApiError::forbidden("Admin access required"))
            }
        }))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        ApiError::internal(
            "Internal Server Error",
            anyhow::anyhow!("AppState is not registered"),
        )
    })?;

    let token = bearer_token(req).ok_or_else(|| ApiError::unauthorized("No token provided"))?;

    let claims = verify_jwt(token, state.jwt_secret()).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    Ok(AuthUser {
        id: claims.sub,
        role: claims.role,
    })
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .trim()
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
