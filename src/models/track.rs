//! Track model and the joined track/release view

use serde::{Deserialize, Serialize};

/// Contribution of an artist to a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtistRole {
    Main,
    Featured,
}

impl ArtistRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtistRole::Main => "main",
            ArtistRole::Featured => "featured",
        }
    }
}

/// A track about to be inserted
#[derive(Debug, Clone)]
pub struct NewTrack {
    pub title: String,
    pub genre: String,
    pub isrc_code: Option<String>,
    pub audio_url: String,
    pub duration_ms: i64,
    /// 1-based position within the release
    pub track_number: i64,
    /// Requested featured artist ids
    pub featuring: Vec<String>,
}

/// Convert seconds to whole milliseconds
pub fn seconds_to_ms(seconds: f64) -> i64 {
    (seconds * 1000.0).round() as i64
}

/// One track of a release joined with its release and primary artist
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReleaseTrackRow {
    /// Track id
    pub id: String,
    pub title: String,
    pub genre: String,
    pub isrc_code: Option<String>,
    pub audio_url: String,
    pub duration_ms: i64,
    pub track_number: i64,
    pub release_id: String,
    pub release_title: String,
    pub release_type: Option<String>,
    pub release_date: Option<String>,
    pub cover_url: String,
    pub status: String,
    pub is_published: bool,
    pub artist_id: String,
    pub artist_name: String,
    /// Featured artist names, comma separated
    pub featuring: String,
}
