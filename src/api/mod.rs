//! REST API routes for releasehub

pub mod admin;
pub mod artist;
pub mod auth;
pub mod guard;
pub mod library;
pub mod releases;


use actix_web::{get, web, HttpResponse, Responder};

use crate::error::ApiError;

/// GET /
#[get("/")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "Upload API"
    }))
}

/// Malformed JSON bodies get the same `{"error"}` shape as everything else
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::bad_request(format!("Invalid JSON body: {}", err)).into())
}

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(health)
        // Auth routes
        .configure(auth::configure)
        // Artist search
        .configure(artist::configure)
        // Release upload and read routes
        .configure(releases::configure)
        // Library routes
        .configure(library::configure)
        // Admin review routes
        .service(web::scope("/admin").configure(admin::configure));
}
