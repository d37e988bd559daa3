/// Bookmark import endpoint
///
/// `POST /api/import?format=<linkstash|pinboard>` ingests a dump of
/// bookmarks in one request. The linkstash format is this API's own link
/// shape; the pinboard format is the export of pinboard.in (and of the
/// del.icio.us lineage it inherits). Each imported link is inserted,
/// tagged, and queued for search indexing.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::AuthUser,
    query::QueryParams,
};
use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    Json,
};
use chrono::DateTime;
use linkstash_shared::{
    models::link::{parse_url, CreateLink, Link},
    search::{LinkDocument, MirrorTask},
};
use serde::Deserialize;
use serde_json::Value;

/// A bookmark in the linkstash dump format
#[derive(Debug, Deserialize)]
pub struct LinkstashEntry {
    pub url: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub timestamp: Option<i64>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// A bookmark in the pinboard export format
///
/// Pinboard calls the title "description" and the description "extended";
/// tags are one space-separated string.
#[derive(Debug, Deserialize)]
pub struct PinboardEntry {
    pub href: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub extended: String,

    #[serde(default)]
    pub time: String,

    #[serde(default)]
    pub tags: String,
}

/// One bookmark normalized out of either dump format
struct ImportedLink {
    url: String,
    title: String,
    description: String,
    timestamp: Option<i64>,
    tags: Vec<String>,
}

impl From<LinkstashEntry> for ImportedLink {
    fn from(entry: LinkstashEntry) -> Self {
        ImportedLink {
            url: entry.url,
            title: entry.title,
            description: entry.description,
            timestamp: entry.timestamp,
            tags: entry.tags,
        }
    }
}

impl From<PinboardEntry> for ImportedLink {
    fn from(entry: PinboardEntry) -> Self {
        ImportedLink {
            url: entry.href,
            title: entry.description,
            description: entry.extended,
            timestamp: parse_rfc3339(&entry.time),
            tags: split_pinboard_tags(&entry.tags),
        }
    }
}

/// Parses an RFC 3339 timestamp; `None` falls back to import time
fn parse_rfc3339(time: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(time)
        .ok()
        .map(|dt| dt.timestamp())
}

/// Splits pinboard's space-separated tag string
fn split_pinboard_tags(tags: &str) -> Vec<String> {
    tags.split_whitespace().map(|t| t.to_string()).collect()
}

/// Import a bookmark dump
///
/// # Errors
///
/// - `400 Bad Request`: Unknown format, undecodable body, or a link with a
///   malformed URL
pub async fn import_links(
    State(state): State<AppState>,
    auth: AuthUser,
    RawQuery(raw): RawQuery,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Vec<LinkDocument>>)> {
    let params = QueryParams::parse(raw.as_deref());

    let entries: Vec<ImportedLink> = match params.first("format") {
        Some("linkstash") => {
            let entries: Vec<LinkstashEntry> = serde_json::from_value(body)
                .map_err(|err| ApiError::BadRequest(format!("Invalid dump: {}", err)))?;
            entries.into_iter().map(ImportedLink::from).collect()
        }
        Some("pinboard") => {
            let entries: Vec<PinboardEntry> = serde_json::from_value(body)
                .map_err(|err| ApiError::BadRequest(format!("Invalid dump: {}", err)))?;
            entries.into_iter().map(ImportedLink::from).collect()
        }
        other => {
            return Err(ApiError::BadRequest(format!(
                "Unsupported import format: {}",
                other.unwrap_or("none")
            )))
        }
    };

    let mut imported = Vec::with_capacity(entries.len());
    for entry in entries {
        let url = parse_url(&entry.url)?;

        let link = Link::create(
            &state.db,
            auth.user.id,
            CreateLink {
                url,
                title: entry.title,
                description: entry.description,
                timestamp: entry.timestamp,
            },
        )
        .await?;

        Link::set_tags(&state.db, auth.user.id, link.id, &entry.tags).await?;
        let link = Link::find_by_id(&state.db, auth.user.id, link.id)
            .await?
            .ok_or_else(|| ApiError::InternalError("Imported link vanished".to_string()))?;

        let doc = LinkDocument::from(&link);
        state
            .mirror
            .enqueue(MirrorTask::Index(doc.clone().for_index(auth.user.id, None)));

        imported.push(doc);
    }

    tracing::info!(
        user_id = auth.user.id,
        count = imported.len(),
        "Bookmarks imported"
    );

    Ok((StatusCode::CREATED, Json(imported)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinboard_tag_splitting() {
        assert_eq!(split_pinboard_tags("rust news"), vec!["rust", "news"]);
        assert_eq!(split_pinboard_tags("solo"), vec!["solo"]);
        assert!(split_pinboard_tags("").is_empty());
        assert!(split_pinboard_tags("   ").is_empty());
    }

    #[test]
    fn test_timestamp_fallback() {
        assert_eq!(
            parse_rfc3339("2017-11-05T14:30:00Z"),
            Some(1509892200)
        );
        assert_eq!(parse_rfc3339("not a time"), None);
        assert_eq!(parse_rfc3339(""), None);
    }

    #[test]
    fn test_pinboard_field_mapping() {
        let entry = PinboardEntry {
            href: "https://example.com/".to_string(),
            description: "The title".to_string(),
            extended: "The description".to_string(),
            time: "bad".to_string(),
            tags: "a b".to_string(),
        };

        let link = ImportedLink::from(entry);
        assert_eq!(link.url, "https://example.com/");
        assert_eq!(link.title, "The title");
        assert_eq!(link.description, "The description");
        assert_eq!(link.timestamp, None);
        assert_eq!(link.tags, vec!["a", "b"]);
    }
}
