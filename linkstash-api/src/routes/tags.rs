/// Tag management endpoints
///
/// # Endpoints
///
/// - `GET /api/tags` - List tags, optionally filtered by name
/// - `POST /api/tag` - Create a tag
/// - `GET /api/tag/:id` - Fetch a tag, optionally with its links
/// - `PUT /api/tag/:id` - Partially edit a tag
/// - `DELETE /api/tag/:id` - Delete a tag, optionally cascading to links
///
/// The cascading delete is deliberately not transactional across links: each
/// link is deleted (and de-indexed) on its own, failures are collected, and
/// the tag itself is only removed once every link went. A partial failure
/// reports which ids succeeded so the caller can retry just the rest.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::AuthUser,
    query::QueryParams,
    routes::links::non_empty,
};
use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    Json,
};
use linkstash_shared::{
    models::{link::Link, tag::Tag},
    search::{LinkDocument, MirrorTask},
};
use serde::{Deserialize, Serialize};

/// Create / edit request; absent fields keep their stored value on edit
#[derive(Debug, Deserialize)]
pub struct TagRequest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Tag response, with links attached when requested
#[derive(Debug, Serialize)]
pub struct TagResponse {
    #[serde(flatten)]
    pub tag: Tag,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkDocument>>,
}

/// List tags
///
/// `?tag=<name>` (repeatable) narrows the listing to the named tags.
pub async fn list_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Vec<Tag>>> {
    let params = QueryParams::parse(raw.as_deref());
    let names = params.all("tag");

    let tags = if names.is_empty() {
        Tag::list_by_owner(&state.db, auth.user.id).await?
    } else {
        Tag::list_by_names(&state.db, auth.user.id, &names).await?
    };

    Ok(Json(tags))
}

/// Create a tag
///
/// # Errors
///
/// - `409 Conflict`: The user already has a tag with that name
pub async fn create_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<TagRequest>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    let name = req
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Tag name is required".to_string()))?;
    let description = req.description.unwrap_or_default();

    let tag = Tag::create(&state.db, auth.user.id, &name, &description).await?;

    Ok((StatusCode::CREATED, Json(tag)))
}

/// Fetch a tag
///
/// `?include-links` attaches every link carrying the tag, each with its full
/// tag set.
pub async fn get_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<TagResponse>> {
    let params = QueryParams::parse(raw.as_deref());

    let tag = Tag::find_by_id(&state.db, auth.user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    let links = if params.flag("include-links") {
        let links = tag.tagged_links(&state.db).await?;
        Some(links.into_iter().map(LinkDocument::from).collect())
    } else {
        None
    };

    Ok(Json(TagResponse { tag, links }))
}

/// Partially edit a tag
///
/// # Errors
///
/// - `404 Not Found`: Unknown or foreign-owned id
/// - `409 Conflict`: New name collides with another of the user's tags
pub async fn update_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<TagRequest>,
) -> ApiResult<Json<Tag>> {
    let existing = Tag::find_by_id(&state.db, auth.user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    let name = non_empty(req.name).unwrap_or(existing.name);
    let description = non_empty(req.description).unwrap_or(existing.description);

    let tag = Tag::update(&state.db, auth.user.id, id, &name, &description)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    Ok(Json(tag))
}

/// Delete a tag
///
/// `?delete-links` also deletes every link carrying the tag. Per-link
/// failures abort the tag deletion and the response names the ids that
/// were and were not removed.
pub async fn delete_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> ApiResult<StatusCode> {
    let params = QueryParams::parse(raw.as_deref());

    let tag = Tag::find_by_id(&state.db, auth.user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    if params.flag("delete-links") {
        let links = tag.tagged_links(&state.db).await?;
        let ids: Vec<i64> = links.iter().map(|link| link.id).collect();

        let db = &state.db;
        let owner = auth.user.id;
        let (succeeded, failed) = cascade_delete(ids, |link_id| async move {
            Link::delete(db, owner, link_id).await.map(|_| ())
        })
        .await;

        for link_id in &succeeded {
            state.mirror.enqueue(MirrorTask::Delete {
                owner_id: auth.user.id,
                link_id: *link_id,
            });
        }

        // Keep the tag when any link survived, so the caller can retry
        if !failed.is_empty() {
            return Err(ApiError::CascadeFailed { succeeded, failed });
        }
    }

    Tag::delete(&state.db, auth.user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Deletes each id independently and splits the set by outcome
///
/// Order is preserved within both halves. The caller decides what a
/// non-empty failure set means.
async fn cascade_delete<F, Fut, E>(ids: Vec<i64>, mut delete: F) -> (Vec<i64>, Vec<i64>)
where
    F: FnMut(i64) -> Fut,
    Fut: std::future::Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for id in ids {
        match delete(id).await {
            Ok(()) => succeeded.push(id),
            Err(err) => {
                tracing::error!(link_id = id, error = %err, "Cascade delete failed");
                failed.push(id);
            }
        }
    }
    (succeeded, failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cascade_delete_splits_by_outcome() {
        let (succeeded, failed) = cascade_delete(vec![1, 2, 3], |id| async move {
            if id == 2 {
                Err(sqlx::Error::RowNotFound)
            } else {
                Ok(())
            }
        })
        .await;

        assert_eq!(succeeded, vec![1, 3]);
        assert_eq!(failed, vec![2]);
    }

    #[tokio::test]
    async fn test_cascade_delete_all_succeed() {
        let (succeeded, failed) =
            cascade_delete(vec![10, 20], |_| async { Ok::<(), sqlx::Error>(()) }).await;

        assert_eq!(succeeded, vec![10, 20]);
        assert!(failed.is_empty());
    }

    #[tokio::test]
    async fn test_cascade_delete_keeps_going_after_failure() {
        // Every id after the first failure must still be attempted.
        let (succeeded, failed) = cascade_delete(vec![1, 2, 3, 4], |id| async move {
            if id == 1 {
                Err(sqlx::Error::RowNotFound)
            } else {
                Ok(())
            }
        })
        .await;

        assert_eq!(succeeded, vec![2, 3, 4]);
        assert_eq!(failed, vec![1]);
    }
}
