//! Periodic sweep that moves submitted releases out of PROCESSING

use anyhow::Result;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;

use crate::db::{Database, ReleaseTable, SweepReport};

/// Start the release processor on the runtime
pub fn spawn_release_processor(db: Database, delay: Duration, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = process_due_releases(&db, delay).await {
                tracing::error!("Release processing error: {:#}", e);
            }
        }
    })
}

/// Advance every release that has been PROCESSING for at least `delay`
pub async fn process_due_releases(db: &Database, delay: Duration) -> Result<SweepReport> {
    let cutoff = chrono::Utc::now().timestamp_millis() - delay.as_millis() as i64;
    let report = ReleaseTable::advance_processing(db.pool(), cutoff).await?;

    if report.advanced > 0 || report.reverted > 0 {
        tracing::info!(
            "Processed releases: {} ready for review, {} returned to draft",
            report.advanced,
            report.reverted
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{TrackTable, UserTable};
    use crate::models::{NewTrack, Release, ReleaseStatus, User, UserRole};

    #[tokio::test]
    async fn test_delay_is_respected() {
        let db = Database::in_memory().await.unwrap();
        let artist = User::new(
            "dj".to_string(),
            "dj@x.com".to_string(),
            "hash".to_string(),
            UserRole::Artist,
        );
        UserTable::insert(db.pool(), &artist).await.unwrap();

        let release = Release::new(
            "EP1".to_string(),
            None,
            None,
            "http://cdn/c.png".to_string(),
            artist.id.clone(),
        );
        ReleaseTable::insert(db.pool(), &release).await.unwrap();
        let track = NewTrack {
            title: "Track1".to_string(),
            genre: "house".to_string(),
            isrc_code: None,
            audio_url: "http://cdn/a.mp3".to_string(),
            duration_ms: 1000,
            track_number: 1,
            featuring: vec![],
        };
        TrackTable::insert_and_link(db.pool(), &track, &release.id, &artist.id)
            .await
            .unwrap();
        ReleaseTable::submit(db.pool(), &release.id).await.unwrap();

        let report = process_due_releases(&db, Duration::from_secs(3600)).await.unwrap();
        assert_eq!(report, SweepReport::default());

        let report = process_due_releases(&db, Duration::ZERO).await.unwrap();
        assert_eq!(report.advanced, 1);

        let saved = ReleaseTable::get_by_id(db.pool(), &release.id).await.unwrap().unwrap();
        assert_eq!(saved.status, ReleaseStatus::PendingReview);
    }
}
