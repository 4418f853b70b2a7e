//! Track table operations and the joined track/release read views

use anyhow::Result;
use sqlx::SqlitePool;

use crate::models::{ArtistRole, NewTrack, ReleaseStatus, ReleaseTrackRow};

/// Shared projection for every track/release read view
const RELEASE_TRACK_SELECT: &str = r#"
    SELECT
        t.id,
        t.title,
        t.genre,
        t.isrc_code,
        t.audio_url,
        t.duration_ms,
        rt.track_number,
        r.id AS release_id,
        r.title AS release_title,
        r.release_type,
        r.release_date,
        r.cover_url,
        r.status,
        r.is_published,
        u.id AS artist_id,
        u.artist_name,
        COALESCE((
            SELECT group_concat(fu.artist_name, ', ')
            FROM track_artists ta
            JOIN users fu ON fu.id = ta.artist_id
            WHERE ta.track_id = t.id AND ta.role = 'featured'
        ), '') AS featuring
    FROM releases r
    JOIN release_tracks rt ON r.id = rt.release_id
    JOIN tracks t ON rt.track_id = t.id
    JOIN users u ON r.primary_artist_id = u.id
"#;

/// Track table operations
pub struct TrackTable;

impl TrackTable {
    /// Insert a track and link it to its release and artists in one
    /// transaction. Returns the new track id, or `None` when the release is
    /// missing or no longer accepts tracks. Nothing is persisted unless the
    /// whole unit commits: the transaction rolls back when dropped.
    pub async fn insert_and_link(
        pool: &SqlitePool,
        track: &NewTrack,
        release_id: &str,
        artist_id: &str,
    ) -> Result<Option<String>> {
        let track_id = uuid::Uuid::new_v4().to_string();
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO tracks (id, title, genre, isrc_code, audio_url, duration_ms, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&track_id)
        .bind(&track.title)
        .bind(&track.genre)
        .bind(&track.isrc_code)
        .bind(&track.audio_url)
        .bind(track.duration_ms)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&mut *tx)
        .await?;

        // status is read under the write lock, so a release submitted meanwhile is refused
        let linked = sqlx::query(
            r#"
            INSERT INTO release_tracks (release_id, track_id, track_number)
            SELECT id, ?, ? FROM releases WHERE id = ? AND status IN (?, ?)
            "#,
        )
        .bind(&track_id)
        .bind(track.track_number)
        .bind(release_id)
        .bind(ReleaseStatus::Draft.as_str())
        .bind(ReleaseStatus::Rejected.as_str())
        .execute(&mut *tx)
        .await?;

        if linked.rows_affected() != 1 {
            return Ok(None);
        }

        sqlx::query("INSERT INTO track_artists (track_id, artist_id, role) VALUES (?, ?, ?)")
            .bind(&track_id)
            .bind(artist_id)
            .bind(ArtistRole::Main.as_str())
            .execute(&mut *tx)
            .await?;

        // unknown ids and non-artists are skipped rather than failing the upload
        for featured_id in track.featuring.iter().filter(|id| id.as_str() != artist_id) {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO track_artists (track_id, artist_id, role)
                SELECT ?, id, ? FROM users WHERE id = ? AND role = 'artist'
                "#,
            )
            .bind(&track_id)
            .bind(ArtistRole::Featured.as_str())
            .bind(featured_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Some(track_id))
    }

    /// All tracks across an artist's releases, newest release first
    pub async fn get_by_artist(pool: &SqlitePool, artist_id: &str) -> Result<Vec<ReleaseTrackRow>> {
        let sql = format!(
            "{} WHERE r.primary_artist_id = ? ORDER BY r.created_at DESC, rt.track_number ASC",
            RELEASE_TRACK_SELECT
        );

        let rows: Vec<ReleaseTrackRow> = sqlx::query_as(&sql)
            .bind(artist_id)
            .fetch_all(pool)
            .await?;

        Ok(rows)
    }

    /// An artist's library, optionally narrowed to one release type
    pub async fn get_library(
        pool: &SqlitePool,
        artist_id: &str,
        release_type: Option<&str>,
    ) -> Result<Vec<ReleaseTrackRow>> {
        let sql = format!(
            "{} WHERE r.primary_artist_id = ? \
             AND (? IS NULL OR LOWER(r.release_type) = LOWER(?)) \
             ORDER BY r.created_at DESC, rt.track_number ASC",
            RELEASE_TRACK_SELECT
        );

        let rows: Vec<ReleaseTrackRow> = sqlx::query_as(&sql)
            .bind(artist_id)
            .bind(release_type)
            .bind(release_type)
            .fetch_all(pool)
            .await?;

        Ok(rows)
    }

    /// Tracks of one release in track order
    pub async fn get_by_release(pool: &SqlitePool, release_id: &str) -> Result<Vec<ReleaseTrackRow>> {
        let sql = format!(
            "{} WHERE r.id = ? ORDER BY rt.track_number ASC",
            RELEASE_TRACK_SELECT
        );

        let rows: Vec<ReleaseTrackRow> = sqlx::query_as(&sql)
            .bind(release_id)
            .fetch_all(pool)
            .await?;

        Ok(rows)
    }

    /// Get track count
    #[cfg(test)]
    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tracks")
            .fetch_one(pool)
            .await?;

        Ok(row.0)
    }

    /// Roles recorded for a track, as (artist_id, role)
    #[cfg(test)]
    pub async fn artists_for(pool: &SqlitePool, track_id: &str) -> Result<Vec<(String, String)>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT artist_id, role FROM track_artists WHERE track_id = ? ORDER BY role, artist_id",
        )
        .bind(track_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}
