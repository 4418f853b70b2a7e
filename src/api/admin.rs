//! Review queue for admins

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

use crate::api::guard::AdminUser;
use crate::core::{ReleaseLib, Review};
use crate::db::{ReleaseTable, TrackTable};
use crate::error::{internal, ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RejectBody {
    #[serde(default)]
    pub reason: Option<String>,
}

/// GET /admin/releases
#[get("/releases")]
pub async fn pending_releases(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let data = ReleaseTable::pending_review(state.db.pool())
        .await
        .map_err(internal("Failed to fetch releases."))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": data,
    })))
}

/// GET /admin/releases/{release_id}
#[get("/releases/{release_id}")]
pub async fn release_detail(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let release_id = path.into_inner();
    let pool = state.db.pool();

    let release = ReleaseTable::get_by_id(pool, &release_id)
        .await
        .map_err(internal("Failed to fetch release."))?
        .ok_or_else(|| ApiError::not_found("Release not found."))?;
    let tracks = TrackTable::get_by_release(pool, &release_id)
        .await
        .map_err(internal("Failed to fetch release."))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "release": release,
        "tracks": tracks,
    })))
}

/// POST /admin/releases/{release_id}/approve
#[post("/releases/{release_id}/approve")]
pub async fn approve_release(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let status = ReleaseLib::review(&state, &path.into_inner(), Review::Approve, None).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "status": status,
    })))
}

/// POST /admin/releases/{release_id}/reject
#[post("/releases/{release_id}/reject")]
pub async fn reject_release(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: Option<web::Json<RejectBody>>,
) -> ApiResult<HttpResponse> {
    let body = body.map(|b| b.into_inner()).unwrap_or_default();
    let reason = body
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());

    let status = ReleaseLib::review(&state, &path.into_inner(), Review::Reject, reason).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "status": status,
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(pending_releases)
        .service(release_detail)
        .service(approve_release)
        .service(reject_release);
}
