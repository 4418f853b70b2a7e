//! Release model

use serde::{Deserialize, Serialize};

/// Review lifecycle of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseStatus {
    Draft,
    Processing,
    PendingReview,
    Published,
    Rejected,
}

impl ReleaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStatus::Draft => "DRAFT",
            ReleaseStatus::Processing => "PROCESSING",
            ReleaseStatus::PendingReview => "PENDING_REVIEW",
            ReleaseStatus::Published => "PUBLISHED",
            ReleaseStatus::Rejected => "REJECTED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(ReleaseStatus::Draft),
            "PROCESSING" => Some(ReleaseStatus::Processing),
            "PENDING_REVIEW" => Some(ReleaseStatus::PendingReview),
            "PUBLISHED" => Some(ReleaseStatus::Published),
            "REJECTED" => Some(ReleaseStatus::Rejected),
            _ => None,
        }
    }

    /// Tracks can only be attached while the artist still owns the draft
    pub fn accepts_tracks(&self) -> bool {
        matches!(self, ReleaseStatus::Draft | ReleaseStatus::Rejected)
    }

    /// States a release may be submitted for processing from
    pub fn can_submit(&self) -> bool {
        matches!(self, ReleaseStatus::Draft | ReleaseStatus::Rejected)
    }
}

/// A release container (single, EP, album)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub id: String,
    pub title: String,
    pub release_type: Option<String>,
    /// `YYYY-MM-DD`
    pub release_date: Option<String>,
    pub cover_url: String,
    pub primary_artist_id: String,
    pub created_at: i64,
    pub is_published: bool,
    pub status: ReleaseStatus,
    pub status_changed_at: i64,
    pub rejection_reason: Option<String>,
}

impl Release {
    pub fn new(
        title: String,
        release_type: Option<String>,
        release_date: Option<String>,
        cover_url: String,
        primary_artist_id: String,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            release_type,
            release_date,
            cover_url,
            primary_artist_id,
            created_at: now,
            is_published: false,
            status: ReleaseStatus::Draft,
            status_changed_at: now,
            rejection_reason: None,
        }
    }

    pub fn is_owned_by(&self, artist_id: &str) -> bool {
        self.primary_artist_id == artist_id
    }
}

/// Release plus its artist, as listed in the admin review queue
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReleaseSummary {
    pub id: String,
    pub title: String,
    pub release_type: Option<String>,
    pub release_date: Option<String>,
    pub cover_url: String,
    pub status: String,
    pub artist_name: String,
    pub track_count: i64,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip_strings() {
        for status in [
            ReleaseStatus::Draft,
            ReleaseStatus::Processing,
            ReleaseStatus::PendingReview,
            ReleaseStatus::Published,
            ReleaseStatus::Rejected,
        ] {
            assert_eq!(ReleaseStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(
            serde_json::to_value(ReleaseStatus::PendingReview).unwrap(),
            "PENDING_REVIEW"
        );
    }

    #[test]
    fn test_new_release_is_draft() {
        let release = Release::new(
            "EP1".to_string(),
            Some("ep".to_string()),
            None,
            "http://cdn/covers/1-a.png".to_string(),
            "artist-1".to_string(),
        );
        assert_eq!(release.status, ReleaseStatus::Draft);
        assert!(!release.is_published);
        assert!(release.is_owned_by("artist-1"));
        assert!(!release.is_owned_by("artist-2"));
    }

    #[test]
    fn test_track_attachment_states() {
        assert!(ReleaseStatus::Draft.accepts_tracks());
        assert!(ReleaseStatus::Rejected.accepts_tracks());
        assert!(!ReleaseStatus::Processing.accepts_tracks());
        assert!(!ReleaseStatus::Published.accepts_tracks());
    }
}
