//! Utility modules for releasehub

pub mod auth;
pub mod filesystem;
pub mod validation;
