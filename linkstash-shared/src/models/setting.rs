//! Per-user settings storage
//!
//! Settings are arbitrary JSON blobs keyed by `(user, key)`. The server never
//! interprets the values; clients use them for UI preferences and the like.

use serde_json::Value;
use sqlx::PgPool;

/// Maximum length of a setting key in bytes
pub const MAX_KEY_LENGTH: usize = 32;

/// Maximum length of a serialized setting value in bytes
pub const MAX_VALUE_LENGTH: usize = 64 * 1024 - 1;

/// A single user setting
#[derive(Debug, Clone)]
pub struct Setting {
    pub key: String,
    pub value: Value,
}

impl Setting {
    /// Inserts or replaces a setting
    pub async fn upsert(
        pool: &PgPool,
        user_id: i64,
        key: &str,
        value: &Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO settings (user_id, key, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, key) DO UPDATE SET value = EXCLUDED.value
            "#,
        )
        .bind(user_id)
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Fetches a single setting value
    pub async fn get(
        pool: &PgPool,
        user_id: i64,
        key: &str,
    ) -> Result<Option<Value>, sqlx::Error> {
        let row: Option<(Value,)> = sqlx::query_as(
            r#"
            SELECT value FROM settings
            WHERE user_id = $1 AND key = $2
            "#,
        )
        .bind(user_id)
        .bind(key)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Fetches all settings for a user
    pub async fn get_all(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let rows: Vec<(String, Value)> = sqlx::query_as(
            r#"
            SELECT key, value FROM settings
            WHERE user_id = $1
            ORDER BY key
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(key, value)| Setting { key, value })
            .collect())
    }

    /// Deletes a setting, returning whether it existed
    pub async fn delete(pool: &PgPool, user_id: i64, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM settings WHERE user_id = $1 AND key = $2")
            .bind(user_id)
            .bind(key)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Checks whether a setting key is within the allowed length
pub fn key_within_bounds(key: &str) -> bool {
    !key.is_empty() && key.len() <= MAX_KEY_LENGTH
}

/// Checks whether a serialized setting value is within the allowed length
pub fn value_within_bounds(serialized: &str) -> bool {
    serialized.len() <= MAX_VALUE_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bounds() {
        assert!(key_within_bounds("theme"));
        assert!(key_within_bounds(&"k".repeat(MAX_KEY_LENGTH)));
        assert!(!key_within_bounds(""));
        assert!(!key_within_bounds(&"k".repeat(MAX_KEY_LENGTH + 1)));
    }

    #[test]
    fn test_value_bounds() {
        assert!(value_within_bounds("{}"));
        assert!(value_within_bounds(&"v".repeat(MAX_VALUE_LENGTH)));
        assert!(!value_within_bounds(&"v".repeat(MAX_VALUE_LENGTH + 1)));
    }
}
