//! User table operations

use anyhow::Result;
use sqlx::{FromRow, SqlitePool};

use crate::models::{ArtistSummary, User, UserRole};

/// Database row for users table
#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    username: String,
    artist_name: String,
    email: String,
    password: String,
    role: String,
    created_at: i64,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            artist_name: self.artist_name,
            email: self.email,
            password: self.password,
            role: UserRole::from_str(&self.role).unwrap_or_default(),
            created_at: self.created_at,
        }
    }
}

/// User table operations
pub struct UserTable;

impl UserTable {
    /// Get user by email, including the password hash
    pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|r| r.into_user()))
    }

    /// Check whether an account already uses this email
    pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(pool)
            .await?;

        Ok(row.0 > 0)
    }

    /// Insert a user
    pub async fn insert(pool: &SqlitePool, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, artist_name, email, password, role, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.artist_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Case-insensitive substring search over artist usernames
    pub async fn search_artists(
        pool: &SqlitePool,
        query: &str,
        limit: i64,
    ) -> Result<Vec<ArtistSummary>> {
        let pattern = format!("%{}%", escape_like(query));

        let rows: Vec<ArtistSummary> = sqlx::query_as(
            "SELECT id, username FROM users \
             WHERE role = 'artist' AND username LIKE ? ESCAPE '\\' \
             ORDER BY username \
             LIMIT ?",
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn user(username: &str, email: &str, role: UserRole) -> User {
        User::new(username.to_string(), email.to_string(), "hash".to_string(), role)
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::in_memory().await.unwrap();
        let dj = user("dj", "dj@x.com", UserRole::Artist);
        UserTable::insert(db.pool(), &dj).await.unwrap();

        let found = UserTable::get_by_email(db.pool(), "dj@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, dj.id);
        assert_eq!(found.password, "hash");
        assert_eq!(found.role, UserRole::Artist);

        assert!(UserTable::email_exists(db.pool(), "dj@x.com").await.unwrap());
        assert!(!UserTable::email_exists(db.pool(), "no@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_by_index() {
        let db = Database::in_memory().await.unwrap();
        UserTable::insert(db.pool(), &user("a", "same@x.com", UserRole::Artist))
            .await
            .unwrap();

        let err = UserTable::insert(db.pool(), &user("b", "same@x.com", UserRole::Artist))
            .await
            .unwrap_err();
        assert!(crate::db::is_unique_violation(&err));
        let rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows.0, 1);
    }

    #[tokio::test]
    async fn test_search_artists_skips_admins_and_limits() {
        let db = Database::in_memory().await.unwrap();
        for i in 0..12 {
            let u = user(&format!("DJ Nova {}", i), &format!("n{}@x.com", i), UserRole::Artist);
            UserTable::insert(db.pool(), &u).await.unwrap();
        }
        UserTable::insert(db.pool(), &user("dj admin", "adm@x.com", UserRole::Admin))
            .await
            .unwrap();

        let hits = UserTable::search_artists(db.pool(), "nova", 10).await.unwrap();
        assert_eq!(hits.len(), 10);

        let admins = UserTable::search_artists(db.pool(), "admin", 10).await.unwrap();
        assert!(admins.is_empty());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
    }
}
