//! Numbered schema migrations tracked in `dbmigration`

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

/// Version 1 is the baseline schema from `create_tables`
const MIGRATIONS: &[(i32, &[&str])] = &[(
    2,
    // one track per position within a release
    &["CREATE UNIQUE INDEX IF NOT EXISTS idx_release_tracks_number \
       ON release_tracks(release_id, track_number)"],
)];

/// Schema version after every migration has run
pub(crate) const CURRENT_VERSION: i32 = 2;

/// Apply every migration newer than the stored version
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current = get_migration_version(pool).await?;
    if current >= CURRENT_VERSION {
        info!("Database is up to date (version {})", current);
        return Ok(());
    }

    for (version, statements) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        // statements and the version bump land together or not at all
        let mut tx = pool.begin().await?;
        for &sql in statements.iter() {
            sqlx::query(sql)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Migration {} failed", version))?;
        }
        sqlx::query("UPDATE dbmigration SET version = ? WHERE id = 1")
            .bind(*version)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Applied migration {}", version);
    }

    Ok(())
}

/// Stored schema version
pub async fn get_migration_version(pool: &SqlitePool) -> Result<i32> {
    let version: i32 = sqlx::query_scalar("SELECT version FROM dbmigration WHERE id = 1")
        .fetch_one(pool)
        .await?;

    Ok(version)
}
