//! Artist lookup for the featuring picker

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use crate::db::UserTable;
use crate::error::{internal, ApiResult};
use crate::state::AppState;

const MIN_QUERY_CHARS: usize = 2;
const SEARCH_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// GET /search-artists?query=
#[get("/search-artists")]
pub async fn search_artists(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<HttpResponse> {
    let term = query.query.trim();
    if term.chars().count() < MIN_QUERY_CHARS {
        return Ok(HttpResponse::Ok().json(Vec::<String>::new()));
    }

    let artists = UserTable::search_artists(state.db.pool(), term, SEARCH_LIMIT)
        .await
        .map_err(internal("Failed to search artists"))?;

    Ok(HttpResponse::Ok().json(artists))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(search_artists);
}
