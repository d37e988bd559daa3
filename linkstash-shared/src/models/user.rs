/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id            BIGSERIAL PRIMARY KEY,
///     username      VARCHAR(32) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// # use linkstash_shared::models::user::User;
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, "alice", "$argon2id$...").await?;
/// println!("Created user {}", user.id);
///
/// let found = User::find_by_username(&pool, "alice").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// A registered user
///
/// Owns all links, tags, settings, and auth tokens. Deleting a user cascades
/// to every owned entity at the database level.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (assigned on insert)
    pub id: i64,

    /// Username, unique across all users
    pub username: String,

    /// Argon2id password hash, never a plaintext password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// A duplicate username violates the `users_username_key` unique
    /// constraint; callers map that to a conflict error.
    pub async fn create(
        pool: &PgPool,
        username: &str,
        password_hash: &str,
    ) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID, returning `None` if absent
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username, returning `None` if absent
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces the stored password hash
    ///
    /// Callers are expected to revoke all auth tokens afterwards.
    pub async fn set_password(
        pool: &PgPool,
        id: i64,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_hides_secrets() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["username"], "alice");
        assert!(json.get("password_hash").is_none());
    }
}
