/// Auth token storage
///
/// Tokens are stored as SHA-256 digests keyed by `(user_id, token_digest)`.
/// Verification recomputes the digest and probes the composite key, so a
/// check is a single indexed lookup and a digest issued to one user can
/// never validate for another. Multiple concurrent tokens per user are
/// allowed.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE auth_tokens (
///     user_id      BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token_digest VARCHAR(64) NOT NULL,
///     created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, token_digest)
/// );
/// ```

use sqlx::PgPool;

/// Store operations for auth token digests
pub struct AuthToken;

impl AuthToken {
    /// Persists a token digest for a user
    pub async fn insert(pool: &PgPool, user_id: i64, digest: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO auth_tokens (user_id, token_digest) VALUES ($1, $2)")
            .bind(user_id)
            .bind(digest)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Checks whether a digest exists for this user
    ///
    /// O(1) per check via the composite primary key; never scans other
    /// users' tokens.
    pub async fn exists(pool: &PgPool, user_id: i64, digest: &str) -> Result<bool, sqlx::Error> {
        let (found,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM auth_tokens
                WHERE user_id = $1 AND token_digest = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(digest)
        .fetch_one(pool)
        .await?;

        Ok(found)
    }

    /// Revokes a single token digest
    pub async fn delete(pool: &PgPool, user_id: i64, digest: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1 AND token_digest = $2")
            .bind(user_id)
            .bind(digest)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Revokes every token for a user (e.g. after a password change)
    pub async fn delete_all(pool: &PgPool, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
