//! Configuration module for releasehub
//!
//! Path resolution and layered server settings.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{BlobBackend, BlobSettings, Settings};

/// Folder cover art is stored under
pub const COVERS_FOLDER: &str = "covers";

/// Folder audio files are stored under
pub const AUDIO_FOLDER: &str = "audio";
