/// Link management endpoints
///
/// # Endpoints
///
/// - `GET /api/links` - Browse links with filtering, search and pagination
/// - `POST /api/link/save` - Save a new link
/// - `GET /api/link/:id` - Fetch a single link
/// - `PUT /api/link/:id` - Partially edit a link
/// - `DELETE /api/link/:id` - Delete a link
///
/// Reads and writes go to the primary store; every write also enqueues a
/// mirror task so the search index follows along. Handlers never wait for
/// the mirror.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::AuthUser,
    metadata,
    query::QueryParams,
};
use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    Json,
};
use linkstash_shared::{
    filter::{paginate, LinkFilter},
    models::link::{parse_url, CreateLink, Link, UpdateLink},
    search::{LinkDocument, MirrorTask},
};
use serde::{Deserialize, Serialize};

/// Treats an empty string in an edit request the same as an absent field,
/// so a partial edit can never blank a stored value
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Browse response envelope
///
/// `links` is always an array, even when empty; `totalCount` is the match
/// count before pagination.
#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    pub links: Vec<LinkDocument>,

    #[serde(rename = "totalCount")]
    pub total_count: usize,
}

/// Save request
#[derive(Debug, Deserialize)]
pub struct SaveLinkRequest {
    pub url: String,

    /// Title; scraped from the page when absent or empty
    #[serde(default)]
    pub title: Option<String>,

    /// Description; scraped from the page when absent or empty
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Edit request; absent fields keep their stored value
#[derive(Debug, Deserialize)]
pub struct EditLinkRequest {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Full replacement tag set when present
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Browse links
///
/// Without `?search` the candidate set comes from the primary store and is
/// narrowed in-process; with it, the search mirror answers and the tag and
/// domain constraints travel inside the search query. Both paths share the
/// pagination step and the response envelope.
///
/// # Query parameters
///
/// - `search` - free-text query routed through the search mirror
/// - `tag` (repeatable) - tag names to match
/// - `exclusivetags` - flag; require every listed tag instead of any
/// - `domain` (repeatable) - accepted domains
/// - `page`, `pagesize` - 1-indexed pagination; omit to fetch everything
pub async fn browse_links(
    State(state): State<AppState>,
    auth: AuthUser,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<BrowseResponse>> {
    let params = QueryParams::parse(raw.as_deref());

    let tags = params.all("tag");
    let domains = params.all("domain");
    let exclusive_tags = params.flag("exclusivetags");
    let page = params.int("page", 0);
    let page_size = params.int("pagesize", 0);

    // An empty search value is the same as no search: full-text routing
    // only makes sense with something to match.
    let candidates: Vec<LinkDocument> = match params.first("search").filter(|s| !s.is_empty()) {
        Some(text) => {
            state
                .search
                .search(auth.user.id, text, &tags, &domains, exclusive_tags)
                .await?
        }
        None => {
            let filter = LinkFilter {
                tags,
                exclusive_tags,
                domains,
            };

            Link::list_by_owner(&state.db, auth.user.id)
                .await?
                .into_iter()
                .filter(|link| filter.matches(&link.domain, &link.tags))
                .map(LinkDocument::from)
                .collect()
        }
    };

    let (links, total_count) = paginate(candidates, page, page_size);

    Ok(Json(BrowseResponse { links, total_count }))
}

/// Save a new link
///
/// The page is always fetched: its body feeds the search index, and its
/// metadata fills in whatever the client left blank. Client-supplied title
/// and description always win over scraped ones.
pub async fn save_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SaveLinkRequest>,
) -> ApiResult<(StatusCode, Json<LinkDocument>)> {
    let url = parse_url(&req.url)?;

    let meta = metadata::scrape(&url.url).await;
    let title = req.title.filter(|t| !t.is_empty()).unwrap_or(meta.title);
    let description = req
        .description
        .filter(|d| !d.is_empty())
        .unwrap_or(meta.description);

    let link = Link::create(
        &state.db,
        auth.user.id,
        CreateLink {
            url,
            title,
            description,
            timestamp: None,
        },
    )
    .await?;

    Link::set_tags(&state.db, auth.user.id, link.id, &req.tags).await?;
    let link = Link::find_by_id(&state.db, auth.user.id, link.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Saved link vanished".to_string()))?;

    let doc = LinkDocument::from(&link);
    state.mirror.enqueue(MirrorTask::Index(
        doc.clone().for_index(auth.user.id, meta.html),
    ));

    tracing::info!(user_id = auth.user.id, link_id = link.id, "Link saved");

    Ok((StatusCode::CREATED, Json(doc)))
}

/// Fetch a single link
pub async fn get_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<LinkDocument>> {
    let link = Link::find_by_id(&state.db, auth.user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Link not found".to_string()))?;

    Ok(Json(LinkDocument::from(link)))
}

/// Partially edit a link
///
/// Absent or empty fields keep their stored values; a present `tags` array
/// replaces the tag set wholesale. The updated link is re-fetched and
/// re-indexed.
pub async fn update_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<EditLinkRequest>,
) -> ApiResult<Json<LinkDocument>> {
    let url = match non_empty(req.url) {
        Some(raw) => Some(parse_url(&raw)?),
        None => None,
    };

    let link = Link::update(
        &state.db,
        auth.user.id,
        id,
        UpdateLink {
            url,
            title: non_empty(req.title),
            description: non_empty(req.description),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Link not found".to_string()))?;

    let link = match req.tags {
        Some(tags) => {
            Link::set_tags(&state.db, auth.user.id, link.id, &tags).await?;
            Link::find_by_id(&state.db, auth.user.id, link.id)
                .await?
                .ok_or_else(|| ApiError::InternalError("Edited link vanished".to_string()))?
        }
        None => link,
    };

    // Refresh the page body so the index keeps searchable content
    let meta = metadata::scrape(&link.url).await;

    let doc = LinkDocument::from(&link);
    state.mirror.enqueue(MirrorTask::Index(
        doc.clone().for_index(auth.user.id, meta.html),
    ));

    Ok(Json(doc))
}

/// Delete a link
pub async fn delete_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = Link::delete(&state.db, auth.user.id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Link not found".to_string()));
    }

    state.mirror.enqueue(MirrorTask::Delete {
        owner_id: auth.user.id,
        link_id: id,
    });

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_drops_blank_edit_fields() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("kept".to_string())), Some("kept".to_string()));
    }

    #[test]
    fn test_blank_edit_request_keeps_stored_values() {
        // An edit body full of empty strings must translate to an update
        // that touches nothing.
        let req: EditLinkRequest = serde_json::from_value(serde_json::json!({
            "url": "",
            "title": "",
            "description": ""
        }))
        .unwrap();

        assert_eq!(non_empty(req.url), None);
        assert_eq!(non_empty(req.title), None);
        assert_eq!(non_empty(req.description), None);
    }

    #[test]
    fn test_empty_search_param_means_no_search() {
        // `?search=` must take the primary-store path, exactly like a
        // request with no search parameter at all.
        let params = QueryParams::parse(Some("search=&tag=rust"));
        assert_eq!(params.first("search").filter(|s| !s.is_empty()), None);

        let params = QueryParams::parse(Some("search=rust"));
        assert_eq!(
            params.first("search").filter(|s| !s.is_empty()),
            Some("rust")
        );
    }
}
