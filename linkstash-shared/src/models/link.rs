/// Link model and database operations
///
/// A link belongs to exactly one user. The `domain` column is denormalized
/// from the URL for fast domain filtering and the `tags` list on the read
/// model is a derived view recomputed from the association table on every
/// read. Neither is independently writable: `ParsedUrl` is the only way to
/// get a URL/domain pair into the store, and a `Link` value can only be
/// constructed by the rehydration path in this module.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE links (
///     id          BIGSERIAL PRIMARY KEY,
///     url         VARCHAR(2047) NOT NULL,
///     domain      VARCHAR(255) NOT NULL,
///     title       VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     timestamp   BIGINT NOT NULL,
///     owner_id    BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// );
/// CREATE TABLE link_tags (
///     link_id BIGINT NOT NULL REFERENCES links(id) ON DELETE CASCADE,
///     tag_id  BIGINT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
///     PRIMARY KEY (link_id, tag_id)
/// );
/// ```

use std::collections::HashMap;

use sqlx::PgPool;

/// Error for malformed link URLs
#[derive(Debug, thiserror::Error)]
#[error("Malformed URL: {0}")]
pub struct InvalidUrl(#[from] url::ParseError);

/// A syntactically valid absolute URL with its derived domain
///
/// Constructed only through [`parse_url`], so every URL reaching the store
/// has been validated and its domain derived from canonical data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Normalized URL string
    pub url: String,

    /// Hostname extracted from the URL (empty for host-less schemes)
    pub domain: String,
}

/// Validates URL syntax and derives the domain
///
/// # Example
///
/// ```
/// use linkstash_shared::models::link::parse_url;
///
/// let parsed = parse_url("https://a.example.com/x").unwrap();
/// assert_eq!(parsed.domain, "a.example.com");
///
/// assert!(parse_url("not a url").is_err());
/// ```
pub fn parse_url(raw: &str) -> Result<ParsedUrl, InvalidUrl> {
    let parsed = url::Url::parse(raw)?;
    let domain = parsed.host_str().unwrap_or("").to_string();

    Ok(ParsedUrl {
        url: parsed.to_string(),
        domain,
    })
}

/// Raw link row as stored in the database, without the derived tag list
#[derive(Debug, Clone, sqlx::FromRow)]
struct LinkRow {
    id: i64,
    url: String,
    domain: String,
    title: String,
    description: String,
    timestamp: i64,
    owner_id: i64,
}

/// A link rehydrated with its current tag-name set
///
/// The tag list is derived from the association table at read time; it is
/// never the source of truth and there is no way to construct a `Link`
/// outside the store reads in this module.
#[derive(Debug, Clone)]
pub struct Link {
    /// Unique link ID (assigned on insert)
    pub id: i64,

    /// Saved URL
    pub url: String,

    /// Hostname derived from the URL
    pub domain: String,

    /// Page title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Unix timestamp, touched on every insert and update
    pub timestamp: i64,

    /// Owning user
    pub owner_id: i64,

    /// Names of the tags attached to this link, sorted
    pub tags: Vec<String>,
}

impl Link {
    fn from_parts(row: LinkRow, tags: Vec<String>) -> Self {
        Link {
            id: row.id,
            url: row.url,
            domain: row.domain,
            title: row.title,
            description: row.description,
            timestamp: row.timestamp,
            owner_id: row.owner_id,
            tags,
        }
    }
}

/// Input for creating a link
#[derive(Debug, Clone)]
pub struct CreateLink {
    /// Validated URL with derived domain
    pub url: ParsedUrl,

    /// Page title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Explicit timestamp (imports); None = current time
    pub timestamp: Option<i64>,
}

/// Input for partially updating a link
///
/// Only `Some` fields overwrite; the timestamp is refreshed regardless of
/// which fields changed.
#[derive(Debug, Clone, Default)]
pub struct UpdateLink {
    /// New URL (domain is recomputed)
    pub url: Option<ParsedUrl>,

    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,
}

impl Link {
    /// Creates a new link
    ///
    /// Stamps the current time unless `data.timestamp` is set, persists the
    /// row, and returns it with the assigned id and an empty tag set.
    pub async fn create(
        pool: &PgPool,
        owner_id: i64,
        data: CreateLink,
    ) -> Result<Self, sqlx::Error> {
        let timestamp = data
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp());

        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (url, domain, title, description, timestamp, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, url, domain, title, description, timestamp, owner_id
            "#,
        )
        .bind(&data.url.url)
        .bind(&data.url.domain)
        .bind(&data.title)
        .bind(&data.description)
        .bind(timestamp)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(Link::from_parts(row, Vec::new()))
    }

    /// Partially updates a link, always refreshing the timestamp
    ///
    /// Returns the updated link rehydrated with its tags, or `None` if the
    /// id does not exist or belongs to another user.
    pub async fn update(
        pool: &PgPool,
        owner_id: i64,
        id: i64,
        data: UpdateLink,
    ) -> Result<Option<Self>, sqlx::Error> {
        let timestamp = chrono::Utc::now().timestamp();

        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            UPDATE links
            SET url = COALESCE($3, url),
                domain = COALESCE($4, domain),
                title = COALESCE($5, title),
                description = COALESCE($6, description),
                timestamp = $7
            WHERE id = $1 AND owner_id = $2
            RETURNING id, url, domain, title, description, timestamp, owner_id
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(data.url.as_ref().map(|u| u.url.clone()))
        .bind(data.url.as_ref().map(|u| u.domain.clone()))
        .bind(data.title)
        .bind(data.description)
        .bind(timestamp)
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) => {
                let tags = Self::tags_for(pool, row.id).await?;
                Ok(Some(Link::from_parts(row, tags)))
            }
            None => Ok(None),
        }
    }

    /// Deletes a link and its tag associations
    ///
    /// Association rows are removed before the link row inside one
    /// transaction, so no orphaned associations can survive.
    ///
    /// Returns `false` if the id does not exist or belongs to another user.
    pub async fn delete(pool: &PgPool, owner_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM link_tags
            WHERE link_id = $1
              AND link_id IN (SELECT id FROM links WHERE id = $1 AND owner_id = $2)
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM links WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Finds a link by id, scoped to its owner
    ///
    /// A missing id and an id owned by someone else are indistinguishable;
    /// both return `None`.
    pub async fn find_by_id(
        pool: &PgPool,
        owner_id: i64,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, url, domain, title, description, timestamp, owner_id
            FROM links
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) => {
                let tags = Self::tags_for(pool, row.id).await?;
                Ok(Some(Link::from_parts(row, tags)))
            }
            None => Ok(None),
        }
    }

    /// Lists all links owned by a user, in insertion order
    ///
    /// Tags are rehydrated with a single grouped association query rather
    /// than one query per link.
    pub async fn list_by_owner(pool: &PgPool, owner_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, url, domain, title, description, timestamp, owner_id
            FROM links
            WHERE owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        let mut tag_map: HashMap<i64, Vec<String>> = HashMap::new();
        let pairs: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT lt.link_id, t.name
            FROM link_tags lt
            JOIN tags t ON t.id = lt.tag_id
            WHERE t.owner_id = $1
            ORDER BY lt.link_id, t.name
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        for (link_id, name) in pairs {
            tag_map.entry(link_id).or_default().push(name);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = tag_map.remove(&row.id).unwrap_or_default();
                Link::from_parts(row, tags)
            })
            .collect())
    }

    /// Replaces the entire tag set of a link
    ///
    /// Full-replace semantics, not a diff: names without an existing tag for
    /// this owner are auto-created, then every current association is
    /// deleted and the new set inserted, all in one transaction. Calling
    /// this twice with the same list leaves the association table in an
    /// identical state.
    pub async fn set_tags(
        pool: &PgPool,
        owner_id: i64,
        link_id: i64,
        names: &[String],
    ) -> Result<(), sqlx::Error> {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            if !name.is_empty() && !unique.contains(name) {
                unique.push(name.clone());
            }
        }

        let mut tx = pool.begin().await?;

        if !unique.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO tags (name, description, owner_id)
                SELECT unnest($1::text[]), '', $2
                ON CONFLICT (owner_id, name) DO NOTHING
                "#,
            )
            .bind(&unique)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM link_tags WHERE link_id = $1")
            .bind(link_id)
            .execute(&mut *tx)
            .await?;

        if !unique.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO link_tags (link_id, tag_id)
                SELECT $1, id FROM tags
                WHERE owner_id = $2 AND name = ANY($3)
                "#,
            )
            .bind(link_id)
            .bind(owner_id)
            .bind(&unique)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Current tag names of a link, sorted
    async fn tags_for(pool: &PgPool, link_id: i64) -> Result<Vec<String>, sqlx::Error> {
        let names: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT t.name
            FROM link_tags lt
            JOIN tags t ON t.id = lt.tag_id
            WHERE lt.link_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(link_id)
        .fetch_all(pool)
        .await?;

        Ok(names.into_iter().map(|(name,)| name).collect())
    }

    /// Rehydrates a batch of rows fetched elsewhere in this crate
    pub(crate) async fn rehydrate_rows(
        pool: &PgPool,
        rows: Vec<(i64, String, String, String, String, i64, i64)>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut links = Vec::with_capacity(rows.len());
        for (id, url, domain, title, description, timestamp, owner_id) in rows {
            let tags = Self::tags_for(pool, id).await?;
            links.push(Link {
                id,
                url,
                domain,
                title,
                description,
                timestamp,
                owner_id,
                tags,
            });
        }
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_derives_domain() {
        let parsed = parse_url("https://a.example.com/x?q=1").unwrap();
        assert_eq!(parsed.domain, "a.example.com");
        assert!(parsed.url.starts_with("https://a.example.com/x"));
    }

    #[test]
    fn test_parse_url_rejects_relative() {
        assert!(parse_url("/relative/path").is_err());
        assert!(parse_url("not a url").is_err());
    }

    #[test]
    fn test_parse_url_hostless_scheme() {
        // Syntactically valid but host-less; domain is simply empty.
        let parsed = parse_url("mailto:user@example.com").unwrap();
        assert_eq!(parsed.domain, "");
    }
}
