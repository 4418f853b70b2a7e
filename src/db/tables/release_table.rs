//! Release table operations

use anyhow::Result;
use sqlx::{FromRow, SqlitePool};

use crate::models::{Release, ReleaseStatus, ReleaseSummary};

/// Database row for releases table
#[derive(Debug, FromRow)]
struct ReleaseRow {
    id: String,
    title: String,
    release_type: Option<String>,
    release_date: Option<String>,
    cover_url: String,
    primary_artist_id: String,
    created_at: i64,
    is_published: bool,
    status: String,
    status_changed_at: i64,
    rejection_reason: Option<String>,
}

impl ReleaseRow {
    fn into_release(self) -> Release {
        Release {
            id: self.id,
            title: self.title,
            release_type: self.release_type,
            release_date: self.release_date,
            cover_url: self.cover_url,
            primary_artist_id: self.primary_artist_id,
            created_at: self.created_at,
            is_published: self.is_published,
            status: ReleaseStatus::from_str(&self.status).unwrap_or(ReleaseStatus::Draft),
            status_changed_at: self.status_changed_at,
            rejection_reason: self.rejection_reason,
        }
    }
}

/// Outcome of one processing sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Moved on to PENDING_REVIEW
    pub advanced: u64,
    /// Sent back to DRAFT because they had no tracks
    pub reverted: u64,
}

/// Release table operations
pub struct ReleaseTable;

impl ReleaseTable {
    /// Insert a release
    pub async fn insert(pool: &SqlitePool, release: &Release) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO releases
            (id, title, release_type, release_date, cover_url, primary_artist_id,
             created_at, is_published, status, status_changed_at, rejection_reason)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&release.id)
        .bind(&release.title)
        .bind(&release.release_type)
        .bind(&release.release_date)
        .bind(&release.cover_url)
        .bind(&release.primary_artist_id)
        .bind(release.created_at)
        .bind(release.is_published)
        .bind(release.status.as_str())
        .bind(release.status_changed_at)
        .bind(&release.rejection_reason)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get release by ID
    pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Release>> {
        let row: Option<ReleaseRow> = sqlx::query_as("SELECT * FROM releases WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|r| r.into_release()))
    }

    /// Number of tracks linked to a release
    pub async fn track_count(pool: &SqlitePool, id: &str) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM release_tracks WHERE release_id = ?")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(row.0)
    }

    /// DRAFT/REJECTED -> PROCESSING. Returns false when the release was not
    /// in a submittable state.
    pub async fn submit(pool: &SqlitePool, id: &str) -> Result<bool> {
        Self::transition(
            pool,
            id,
            &[ReleaseStatus::Draft, ReleaseStatus::Rejected],
            ReleaseStatus::Processing,
            None,
        )
        .await
    }

    /// PENDING_REVIEW -> PUBLISHED
    pub async fn approve(pool: &SqlitePool, id: &str) -> Result<bool> {
        Self::transition(
            pool,
            id,
            &[ReleaseStatus::PendingReview],
            ReleaseStatus::Published,
            None,
        )
        .await
    }

    /// PENDING_REVIEW -> REJECTED
    pub async fn reject(pool: &SqlitePool, id: &str, reason: Option<&str>) -> Result<bool> {
        Self::transition(
            pool,
            id,
            &[ReleaseStatus::PendingReview],
            ReleaseStatus::Rejected,
            reason,
        )
        .await
    }

    async fn transition(
        pool: &SqlitePool,
        id: &str,
        from: &[ReleaseStatus],
        to: ReleaseStatus,
        reason: Option<&str>,
    ) -> Result<bool> {
        let placeholders = vec!["?"; from.len()].join(", ");
        let sql = format!(
            "UPDATE releases \
             SET status = ?, status_changed_at = ?, is_published = ?, rejection_reason = ? \
             WHERE id = ? AND status IN ({})",
            placeholders
        );

        let mut query = sqlx::query(&sql)
            .bind(to.as_str())
            .bind(chrono::Utc::now().timestamp_millis())
            .bind(to == ReleaseStatus::Published)
            .bind(reason)
            .bind(id);
        for status in from {
            query = query.bind(status.as_str());
        }

        let result = query.execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move every release that has sat in PROCESSING since `cutoff_ms` or
    /// earlier. Conditional on the current status, so repeated sweeps and
    /// concurrent admin actions never double-apply.
    pub async fn advance_processing(pool: &SqlitePool, cutoff_ms: i64) -> Result<SweepReport> {
        let now = chrono::Utc::now().timestamp_millis();

        let advanced = sqlx::query(
            r#"
            UPDATE releases
            SET status = 'PENDING_REVIEW', status_changed_at = ?
            WHERE status = 'PROCESSING'
              AND status_changed_at <= ?
              AND EXISTS (SELECT 1 FROM release_tracks rt WHERE rt.release_id = releases.id)
            "#,
        )
        .bind(now)
        .bind(cutoff_ms)
        .execute(pool)
        .await?
        .rows_affected();

        let reverted = sqlx::query(
            r#"
            UPDATE releases
            SET status = 'DRAFT', status_changed_at = ?
            WHERE status = 'PROCESSING'
              AND status_changed_at <= ?
              AND NOT EXISTS (SELECT 1 FROM release_tracks rt WHERE rt.release_id = releases.id)
            "#,
        )
        .bind(now)
        .bind(cutoff_ms)
        .execute(pool)
        .await?
        .rows_affected();

        Ok(SweepReport { advanced, reverted })
    }

    /// Releases waiting for an admin, oldest first
    pub async fn pending_review(pool: &SqlitePool) -> Result<Vec<ReleaseSummary>> {
        let rows: Vec<ReleaseSummary> = sqlx::query_as(
            r#"
            SELECT
                r.id, r.title, r.release_type, r.release_date, r.cover_url, r.status,
                u.artist_name,
                (SELECT COUNT(*) FROM release_tracks rt WHERE rt.release_id = r.id) AS track_count,
                r.created_at
            FROM releases r
            JOIN users u ON r.primary_artist_id = u.id
            WHERE r.status = 'PENDING_REVIEW'
            ORDER BY r.status_changed_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}
