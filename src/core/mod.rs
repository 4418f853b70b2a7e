//! Core release pipeline

pub mod processor;
pub mod releaselib;
pub mod upload;

pub use releaselib::{ReleaseLib, Review};
