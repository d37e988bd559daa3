/// Tag model and database operations
///
/// Tags are unique per `(owner, name)`, not globally, so two users can both
/// own a tag named "news". The association table `link_tags` carries no
/// payload beyond the two foreign keys.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id          BIGSERIAL PRIMARY KEY,
///     name        VARCHAR(32) NOT NULL,
///     description TEXT NOT NULL,
///     owner_id    BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     UNIQUE (owner_id, name)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::link::Link;

/// A tag owned by a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    /// Unique tag ID (assigned on insert)
    pub id: i64,

    /// Tag name, unique within the owner's namespace
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Owning user
    #[serde(skip_serializing)]
    pub owner_id: i64,
}

impl Tag {
    /// Creates a new tag
    ///
    /// # Errors
    ///
    /// A duplicate name for the same owner violates the `(owner_id, name)`
    /// unique constraint; callers map that to a conflict error.
    pub async fn create(
        pool: &PgPool,
        owner_id: i64,
        name: &str,
        description: &str,
    ) -> Result<Self, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, owner_id
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(tag)
    }

    /// Updates a tag's name and description
    ///
    /// Returns `None` if the id does not exist or belongs to another user.
    pub async fn update(
        pool: &PgPool,
        owner_id: i64,
        id: i64,
        name: &str,
        description: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tags
            SET name = $3, description = $4
            WHERE id = $1 AND owner_id = $2
            RETURNING id, name, description, owner_id
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    /// Deletes a tag and all its link associations
    ///
    /// Returns `false` if the id does not exist or belongs to another user.
    /// Links carrying the tag are untouched; cascading link deletion is an
    /// explicit multi-step operation orchestrated by the caller because the
    /// search mirror must be kept in sync.
    pub async fn delete(pool: &PgPool, owner_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM link_tags
            WHERE tag_id IN (SELECT id FROM tags WHERE id = $1 AND owner_id = $2)
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Finds a tag by id, scoped to its owner
    pub async fn find_by_id(
        pool: &PgPool,
        owner_id: i64,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, name, description, owner_id
            FROM tags
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    /// Finds a tag by name within the owner's namespace
    pub async fn find_by_name(
        pool: &PgPool,
        owner_id: i64,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, name, description, owner_id
            FROM tags
            WHERE owner_id = $1 AND name = $2
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    /// Lists all tags owned by a user
    pub async fn list_by_owner(pool: &PgPool, owner_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, name, description, owner_id
            FROM tags
            WHERE owner_id = $1
            ORDER BY name
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Lists the owner's tags matching any of the given names
    ///
    /// An empty input list returns an empty result without querying.
    pub async fn list_by_names(
        pool: &PgPool,
        owner_id: i64,
        names: &[String],
    ) -> Result<Vec<Self>, sqlx::Error> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, name, description, owner_id
            FROM tags
            WHERE owner_id = $1 AND name = ANY($2)
            ORDER BY name
            "#,
        )
        .bind(owner_id)
        .bind(names)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Links carrying this tag, each rehydrated with its full tag set
    ///
    /// Filters by one tag but reports every tag of the matched links, which
    /// requires going back through the association table per matched link
    /// (the self-join pattern).
    pub async fn tagged_links(&self, pool: &PgPool) -> Result<Vec<Link>, sqlx::Error> {
        let rows: Vec<(i64, String, String, String, String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT l.id, l.url, l.domain, l.title, l.description, l.timestamp, l.owner_id
            FROM links l
            JOIN link_tags lt ON lt.link_id = l.id
            WHERE lt.tag_id = $1 AND l.owner_id = $2
            ORDER BY l.id
            "#,
        )
        .bind(self.id)
        .bind(self.owner_id)
        .fetch_all(pool)
        .await?;

        Link::rehydrate_rows(pool, rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_serialization_hides_owner() {
        let tag = Tag {
            id: 3,
            name: "news".to_string(),
            description: "".to_string(),
            owner_id: 7,
        };

        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["name"], "news");
        assert!(json.get("owner_id").is_none());
    }
}
