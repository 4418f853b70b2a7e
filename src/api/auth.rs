//! Registration and login routes

use actix_web::{post, web, HttpResponse};
use serde::Deserialize;

use crate::db::{is_unique_violation, UserTable};
use crate::error::{internal, ApiError, ApiResult};
use crate::models::{User, UserRole};
use crate::state::AppState;
use crate::utils::auth::{create_jwt, hash_password, verify_password};
use crate::utils::validation::{is_valid_email, password_problem};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// POST /register/artist
#[post("/register/artist")]
pub async fn register_artist(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    register(&state, body.into_inner(), UserRole::Artist, "User already exists.").await
}

/// POST /register/admin
#[post("/register/admin")]
pub async fn register_admin(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    register(
        &state,
        body.into_inner(),
        UserRole::Admin,
        "Admin already exists with this email.",
    )
    .await
}

/// POST /login
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { email, password } = body.into_inner();
    let (Some(email), Some(password)) = (non_empty(email), password.filter(|p| !p.is_empty()))
    else {
        return Err(ApiError::bad_request("Email and password are required."));
    };

    let user = UserTable::get_by_email(state.db.pool(), &email.to_lowercase())
        .await
        .map_err(internal("Internal Server Error"))?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let stored = user.password.clone();
    let valid = web::block(move || verify_password(&password, &stored))
        .await
        .map_err(internal("Internal Server Error"))?
        .unwrap_or_else(|e| {
            tracing::warn!("Unreadable password hash for user {}: {}", user.id, e);
            false
        });

    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = issue_token(&state, &user)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "token": token,
        "user": user.to_public(),
    })))
}

async fn register(
    state: &AppState,
    body: RegisterRequest,
    role: UserRole,
    exists_message: &'static str,
) -> ApiResult<HttpResponse> {
    let password = body.password.filter(|p| !p.is_empty());
    let (Some(email), Some(password)) = (non_empty(body.email), password) else {
        return Err(ApiError::bad_request("Email and password are required."));
    };

    let email = email.to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email address."));
    }
    if let Some(problem) = password_problem(&password) {
        return Err(ApiError::bad_request(problem));
    }

    let username = non_empty(body.username)
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    let pool = state.db.pool();
    if UserTable::email_exists(pool, &email)
        .await
        .map_err(internal("Internal Server Error"))?
    {
        return Err(ApiError::conflict(exists_message));
    }

    let hash = web::block(move || hash_password(&password))
        .await
        .map_err(internal("Internal Server Error"))?
        .map_err(internal("Internal Server Error"))?;

    let user = User::new(username, email, hash, role);
    if let Err(e) = UserTable::insert(pool, &user).await {
        // lost a race with another registration for the same email
        if is_unique_violation(&e) {
            return Err(ApiError::conflict(exists_message));
        }
        return Err(ApiError::internal("Internal Server Error", e));
    }

    tracing::info!("Registered {} {}", role.as_str(), user.id);

    let token = issue_token(state, &user)?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "token": token,
        "user": user.to_public(),
    })))
}

fn issue_token(state: &AppState, user: &User) -> ApiResult<String> {
    create_jwt(
        &user.id,
        user.role,
        state.jwt_secret(),
        state.settings.token_ttl_secs,
    )
    .map_err(internal("Internal Server Error"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register_artist)
        .service(register_admin)
        .service(login);
}
