//! Data models for releasehub

mod release;
mod track;
mod user;

pub use release::{Release, ReleaseStatus, ReleaseSummary};
pub use track::{seconds_to_ms, ArtistRole, NewTrack, ReleaseTrackRow};
pub use user::{ArtistSummary, PublicUser, User, UserRole};
