//! Artist library routes

use actix_web::{get, web, HttpResponse};

use crate::api::guard::AuthUser;
use crate::db::TrackTable;
use crate::error::{internal, ApiResult};
use crate::state::AppState;

/// GET /library
#[get("/library")]
pub async fn get_library(user: AuthUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    library_response(&state, &user.id, None).await
}

/// GET /library/{release_type}
///
/// `all` disables the filter; other values match case-insensitively.
#[get("/library/{release_type}")]
pub async fn get_library_by_type(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let release_type = path.into_inner();
    let filter = Some(release_type.as_str()).filter(|t| !t.eq_ignore_ascii_case("all"));
    library_response(&state, &user.id, filter).await
}

async fn library_response(
    state: &AppState,
    artist_id: &str,
    release_type: Option<&str>,
) -> ApiResult<HttpResponse> {
    let data = TrackTable::get_library(state.db.pool(), artist_id, release_type)
        .await
        .map_err(internal("Failed to fetch music library."))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": data,
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_library).service(get_library_by_type);
}
