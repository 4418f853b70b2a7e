//! User model

use serde::{Deserialize, Serialize};

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Artist,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Artist => "artist",
            UserRole::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "artist" => Some(UserRole::Artist),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Artist
    }
}

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Database ID (uuid)
    pub id: String,
    /// Login handle, also the searchable artist handle
    pub username: String,
    /// Display name; starts out equal to the username
    pub artist_name: String,
    /// Email address
    pub email: String,
    /// Password hash (not serialized to JSON)
    #[serde(skip_serializing)]
    pub password: String,
    pub role: UserRole,
    /// Unix millis
    pub created_at: i64,
}

impl User {
    /// Create a new user with a fresh id
    pub fn new(username: String, email: String, password_hash: String, role: UserRole) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            artist_name: username.clone(),
            username,
            email,
            password: password_hash,
            role,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Serialize without password (for API responses)
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            artist_name: self.artist_name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Public user info (no password)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub artist_name: String,
    pub email: String,
    pub role: UserRole,
}

/// Row returned by the artist search
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ArtistSummary {
    pub id: String,
    pub username: String,
}
