//! Release ingestion pipeline and status changes

use tracing::{info, warn};

use crate::config::{AUDIO_FOLDER, COVERS_FOLDER};
use crate::core::upload::{ReleaseDraft, TrackDraft, UploadedFile};
use crate::db::{is_unique_violation, ReleaseTable, TrackTable};
use crate::error::{internal, ApiError, ApiResult};
use crate::models::{NewTrack, Release, ReleaseStatus};
use crate::state::AppState;
use crate::storage::BlobStore;

/// Admin decision on a release waiting for review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Review {
    Approve,
    Reject,
}

/// Release pipeline functions
pub struct ReleaseLib;

impl ReleaseLib {
    /// Step 1: store the cover and create a DRAFT release owned by `artist_id`
    pub async fn create_release(
        state: &AppState,
        artist_id: &str,
        draft: ReleaseDraft,
    ) -> ApiResult<Release> {
        let cover_url = upload(state.blobs.as_ref(), draft.cover, COVERS_FOLDER).await?;

        let release = Release::new(
            draft.title,
            draft.release_type,
            draft.release_date,
            cover_url,
            artist_id.to_string(),
        );

        if let Err(e) = ReleaseTable::insert(state.db.pool(), &release).await {
            discard_blob(state.blobs.as_ref(), &release.cover_url).await;
            return Err(ApiError::internal("Internal Server Error", e));
        }

        info!("Created release {} ({})", release.id, release.title);
        Ok(release)
    }

    /// Step 2: store the audio and link a new track to an owned release
    pub async fn attach_track(
        state: &AppState,
        artist_id: &str,
        release_id: &str,
        draft: TrackDraft,
    ) -> ApiResult<String> {
        let release = Self::owned_release(state, artist_id, release_id).await?;
        if !release.status.accepts_tracks() {
            return Err(ApiError::conflict(format!(
                "Tracks cannot be added while the release is {}.",
                release.status.as_str()
            )));
        }

        let audio_url = upload(state.blobs.as_ref(), draft.audio, AUDIO_FOLDER).await?;

        let track = NewTrack {
            title: draft.title,
            genre: draft.genre,
            isrc_code: draft.isrc,
            audio_url,
            duration_ms: draft.duration_ms,
            track_number: draft.track_number,
            featuring: draft.featuring,
        };

        match TrackTable::insert_and_link(state.db.pool(), &track, release_id, artist_id).await {
            Ok(Some(track_id)) => {
                info!(
                    "Attached track {} to release {} at #{}",
                    track_id, release_id, track.track_number
                );
                Ok(track_id)
            }
            Ok(None) => {
                // submitted or reviewed while the audio was uploading
                discard_blob(state.blobs.as_ref(), &track.audio_url).await;
                Err(ApiError::conflict("Tracks cannot be added to this release anymore."))
            }
            Err(e) => {
                discard_blob(state.blobs.as_ref(), &track.audio_url).await;
                if is_unique_violation(&e) {
                    Err(ApiError::conflict(format!(
                        "Track number {} is already used on this release.",
                        track.track_number
                    )))
                } else {
                    Err(ApiError::internal("Server error adding track.", e))
                }
            }
        }
    }

    /// Hand a draft over to processing
    pub async fn submit(
        state: &AppState,
        artist_id: &str,
        release_id: &str,
    ) -> ApiResult<ReleaseStatus> {
        let release = Self::owned_release(state, artist_id, release_id).await?;
        if !release.status.can_submit() {
            return Err(ApiError::conflict(format!(
                "Release is already {}.",
                release.status.as_str()
            )));
        }

        let tracks = ReleaseTable::track_count(state.db.pool(), release_id)
            .await
            .map_err(internal("Failed to submit release."))?;
        if tracks == 0 {
            return Err(ApiError::conflict(
                "Add at least one track before submitting.",
            ));
        }

        let moved = ReleaseTable::submit(state.db.pool(), release_id)
            .await
            .map_err(internal("Failed to submit release."))?;
        if !moved {
            return Err(ApiError::conflict("Release status changed concurrently."));
        }

        info!("Release {} submitted for processing", release_id);
        Ok(ReleaseStatus::Processing)
    }

    /// Approve or reject a release in PENDING_REVIEW
    pub async fn review(
        state: &AppState,
        release_id: &str,
        decision: Review,
        reason: Option<&str>,
    ) -> ApiResult<ReleaseStatus> {
        let pool = state.db.pool();
        ReleaseTable::get_by_id(pool, release_id)
            .await
            .map_err(internal("Failed to fetch release."))?
            .ok_or_else(|| ApiError::not_found("Release not found."))?;

        let (moved, status) = match decision {
            Review::Approve => (
                ReleaseTable::approve(pool, release_id).await,
                ReleaseStatus::Published,
            ),
            Review::Reject => (
                ReleaseTable::reject(pool, release_id, reason).await,
                ReleaseStatus::Rejected,
            ),
        };

        if !moved.map_err(internal("Failed to update release."))? {
            return Err(ApiError::conflict("Release is not pending review."));
        }

        info!("Release {} is now {}", release_id, status.as_str());
        Ok(status)
    }

    async fn owned_release(state: &AppState, artist_id: &str, release_id: &str) -> ApiResult<Release> {
        let release = ReleaseTable::get_by_id(state.db.pool(), release_id)
            .await
            .map_err(internal("Failed to fetch release."))?
            .ok_or_else(|| ApiError::not_found("Release not found."))?;

        if !release.is_owned_by(artist_id) {
            return Err(ApiError::forbidden("You do not own this release."));
        }

        Ok(release)
    }
}

async fn upload(blobs: &dyn BlobStore, file: UploadedFile, folder: &str) -> ApiResult<String> {
    blobs
        .upload(file.data, &file.filename, &file.content_type, folder)
        .await
        .map_err(|e| ApiError::internal("Failed to store upload.", e))
}

/// Best effort removal of a blob whose row never got written
async fn discard_blob(blobs: &dyn BlobStore, url: &str) {
    if let Err(e) = blobs.delete(url).await {
        warn!("Could not remove orphaned blob {}: {}", url, e);
    }
}
