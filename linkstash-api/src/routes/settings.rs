/// Per-user settings endpoints
///
/// Settings are opaque JSON values the server stores but never interprets.
///
/// # Endpoints
///
/// - `GET /api/settings` - All settings as a key/value object
/// - `GET /api/setting/:key` - Single setting value
/// - `PUT /api/setting/:key` - Insert or replace a setting
/// - `DELETE /api/setting/:key` - Remove a setting

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::AuthUser,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use linkstash_shared::models::setting::{self, Setting};
use serde_json::{Map, Value};

/// All settings for the user, keyed by name
pub async fn list_settings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Value>> {
    let settings = Setting::get_all(&state.db, auth.user.id).await?;

    let mut map = Map::new();
    for setting in settings {
        map.insert(setting.key, setting.value);
    }

    Ok(Json(Value::Object(map)))
}

/// Single setting value
pub async fn get_setting(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(key): Path<String>,
) -> ApiResult<Json<Value>> {
    let value = Setting::get(&state.db, auth.user.id, &key)
        .await?
        .ok_or_else(|| ApiError::NotFound("Setting not found".to_string()))?;

    Ok(Json(value))
}

/// Insert or replace a setting
///
/// # Errors
///
/// - `413 Payload Too Large`: Key over 32 chars or serialized value over 64 KB
pub async fn put_setting(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(key): Path<String>,
    Json(value): Json<Value>,
) -> ApiResult<StatusCode> {
    if !setting::key_within_bounds(&key) {
        return Err(ApiError::PayloadTooLarge(format!(
            "Setting keys are limited to {} characters",
            setting::MAX_KEY_LENGTH
        )));
    }

    let serialized = value.to_string();
    if !setting::value_within_bounds(&serialized) {
        return Err(ApiError::PayloadTooLarge(format!(
            "Setting values are limited to {} bytes",
            setting::MAX_VALUE_LENGTH
        )));
    }

    Setting::upsert(&state.db, auth.user.id, &key, &value).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a setting
pub async fn delete_setting(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(key): Path<String>,
) -> ApiResult<StatusCode> {
    let deleted = Setting::delete(&state.db, auth.user.id, &key).await?;
    if !deleted {
        return Err(ApiError::NotFound("Setting not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
