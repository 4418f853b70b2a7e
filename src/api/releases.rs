//! Release upload and read routes

use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpResponse};

use crate::api::guard::AuthUser;
use crate::core::upload::{drain_multipart, ReleaseDraft, TrackDraft, AUDIO_FIELD, COVER_FIELD};
use crate::core::ReleaseLib;
use crate::db::TrackTable;
use crate::error::{internal, ApiResult};
use crate::state::AppState;

/// POST /releases
///
/// Step 1: multipart with `title`, `releaseType`, `releaseDate` and
/// `coverFile`. Creates a DRAFT release owned by the caller.
#[post("/releases")]
pub async fn create_release(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let form = drain_multipart(payload, COVER_FIELD, state.settings.max_upload_bytes).await?;
    let draft = ReleaseDraft::from_form(form)?;

    let release = ReleaseLib::create_release(&state, &user.id, draft).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "releaseId": release.id,
        "releaseTitle": release.title,
        "message": "Release created successfully!",
    })))
}

/// POST /releases/{release_id}/tracks
///
/// Step 2: multipart with `title`, `genre`, `duration` (seconds),
/// `trackNumber`, optional `isrc` and `featuring`, and `audioFile`.
#[post("/releases/{release_id}/tracks")]
pub async fn add_track(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let release_id = path.into_inner();
    let form = drain_multipart(payload, AUDIO_FIELD, state.settings.max_upload_bytes).await?;
    let draft = TrackDraft::from_form(form)?;

    let track_id = ReleaseLib::attach_track(&state, &user.id, &release_id, draft).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "trackId": track_id,
        "message": "Track added successfully.",
    })))
}

/// POST /releases/{release_id}/submit
#[post("/releases/{release_id}/submit")]
pub async fn submit_release(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let status = ReleaseLib::submit(&state, &user.id, &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "status": status,
    })))
}

/// GET /releases and GET /releases/artist
///
/// Every track across the caller's releases.
pub async fn artist_tracks(user: AuthUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let rows = TrackTable::get_by_artist(state.db.pool(), &user.id)
        .await
        .map_err(internal("Failed to fetch tracks and releases."))?;

    Ok(HttpResponse::Ok().json(rows))
}

/// GET /releases/{release_id}
#[get("/releases/{release_id}")]
pub async fn get_release(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let rows = TrackTable::get_by_release(state.db.pool(), &path.into_inner())
        .await
        .map_err(internal("Failed to fetch release."))?;

    Ok(HttpResponse::Ok().json(rows))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    // literal paths go before `/releases/{release_id}`
    cfg.route("/releases", web::get().to(artist_tracks))
        .route("/releases/artist", web::get().to(artist_tracks))
        .service(create_release)
        .service(add_track)
        .service(submit_release)
        .service(get_release);
}
