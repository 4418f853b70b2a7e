//! Database engine and connection management

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use super::migrations::run_migrations;

/// Owns the connection pool; cloned into every handler through app data
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect, create the schema and run pending migrations
    pub async fn connect(url: &str) -> Result<Database> {
        if url.contains(":memory:") {
            return Self::in_memory().await;
        }

        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url {}", url))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        Self::init(pool).await
    }

    /// Private in-memory database. A single never-recycled connection keeps
    /// the data alive for as long as the pool exists.
    pub async fn in_memory() -> Result<Database> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        Self::init(pool).await
    }

    async fn init(pool: SqlitePool) -> Result<Database> {
        let db = Database { pool };
        create_tables(db.pool()).await?;
        run_migrations(db.pool()).await?;
        Ok(db)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Create all database tables
async fn create_tables(pool: &SqlitePool) -> Result<()> {
    // User table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL,
            artist_name TEXT NOT NULL,
            email TEXT NOT NULL,
            password TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'artist',
            created_at INTEGER NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email);
        CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
        "#,
    )
    .execute(pool)
    .await?;

    // Release table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS releases (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            release_type TEXT,
            release_date TEXT,
            cover_url TEXT NOT NULL,
            primary_artist_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            is_published INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'DRAFT',
            status_changed_at INTEGER NOT NULL,
            rejection_reason TEXT,
            FOREIGN KEY (primary_artist_id) REFERENCES users(id)
        );
        CREATE INDEX IF NOT EXISTS idx_releases_artist ON releases(primary_artist_id);
        CREATE INDEX IF NOT EXISTS idx_releases_status ON releases(status);
        "#,
    )
    .execute(pool)
    .await?;

    // Track table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracks (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            genre TEXT NOT NULL,
            isrc_code TEXT,
            audio_url TEXT NOT NULL,
            duration_ms INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Release/track membership and ordering
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS release_tracks (
            release_id TEXT NOT NULL,
            track_id TEXT NOT NULL,
            track_number INTEGER NOT NULL,
            PRIMARY KEY (release_id, track_id),
            FOREIGN KEY (release_id) REFERENCES releases(id),
            FOREIGN KEY (track_id) REFERENCES tracks(id)
        );
        CREATE INDEX IF NOT EXISTS idx_release_tracks_track ON release_tracks(track_id);
        "#,
    )
    .execute(pool)
    .await?;

    // Track attribution
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS track_artists (
            track_id TEXT NOT NULL,
            artist_id TEXT NOT NULL,
            role TEXT NOT NULL,
            PRIMARY KEY (track_id, artist_id, role),
            FOREIGN KEY (track_id) REFERENCES tracks(id),
            FOREIGN KEY (artist_id) REFERENCES users(id)
        );
        CREATE INDEX IF NOT EXISTS idx_track_artists_artist ON track_artists(artist_id);
        "#,
    )
    .execute(pool)
    .await?;

    // Migration table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dbmigration (
            id INTEGER PRIMARY KEY,
            version INTEGER NOT NULL DEFAULT 0
        );
        INSERT OR IGNORE INTO dbmigration (id, version) VALUES (1, 0);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_schema() {
        let db = Database::in_memory().await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();

        for expected in ["release_tracks", "releases", "track_artists", "tracks", "users"] {
            assert!(names.contains(&expected), "missing table {}", expected);
        }
    }

    #[tokio::test]
    async fn test_file_database_reopens() {
        let tmp = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", tmp.path().join("app.db").display());

        let db = Database::connect(&url).await.unwrap();
        db.close().await;

        // schema creation and migrations are idempotent
        let db = Database::connect(&url).await.unwrap();
        let version = super::super::migrations::get_migration_version(db.pool())
            .await
            .unwrap();
        assert_eq!(version, super::super::migrations::CURRENT_VERSION);
    }
}
