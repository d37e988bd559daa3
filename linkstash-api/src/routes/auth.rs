/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register a new user
/// - `POST /api/auth/login` - Login and receive a token
/// - `POST /api/auth/logout` - Revoke the token used for the request
/// - `PUT /api/auth/password` - Change password and rotate all tokens
///
/// Login failures are uniform: an unknown username and a wrong password
/// produce the same 401, so usernames cannot be enumerated.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    extract::AuthUser,
};
use axum::{extract::State, http::StatusCode, Json};
use linkstash_shared::{
    auth::{
        password,
        token::{digest_token, TokenGenerator},
    },
    models::{auth_token::AuthToken, user::User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register / login request
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    /// Username, unique across the instance
    #[validate(length(
        min = 1,
        max = 32,
        message = "Username must be between 1 and 32 characters"
    ))]
    pub username: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password, re-verified before the change
    pub old_password: String,

    /// Replacement password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Response carrying a freshly issued token
///
/// The plaintext token appears here exactly once; only its digest is stored.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// User ID, sent back in the auth header on subsequent requests
    pub id: i64,

    /// Username
    pub username: String,

    /// Opaque auth token
    pub authtoken: String,
}

fn validation_errors(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}

/// Issues a new token for a user and persists its digest
async fn issue_token(state: &AppState, user_id: i64) -> Result<String, ApiError> {
    let token = TokenGenerator::new().generate();
    AuthToken::insert(&state.db, user_id, &digest_token(&token)).await?;
    Ok(token)
}

/// Register a new user
///
/// # Errors
///
/// - `409 Conflict`: Username already in use
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate().map_err(validation_errors)?;

    let password_hash = password::hash_password(&req.password)?;
    let user = User::create(&state.db, &req.username, &password_hash).await?;

    let authtoken = issue_token(&state, user.id).await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            id: user.id,
            username: user.username,
            authtoken,
        }),
    ))
}

/// Login with username and password
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password (uniform)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid username or password".to_string());

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(invalid());
    }

    let authtoken = issue_token(&state, user.id).await?;

    Ok(Json(AuthResponse {
        id: user.id,
        username: user.username,
        authtoken,
    }))
}

/// Revoke the token this request authenticated with
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> ApiResult<StatusCode> {
    AuthToken::delete(&state.db, auth.user.id, &auth.token_digest).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Change password
///
/// Revokes every outstanding token for the user and issues a fresh one, so
/// a stolen token does not survive a password change.
///
/// # Errors
///
/// - `401 Unauthorized`: Old password does not match
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(validation_errors)?;

    if !password::verify_password(&req.old_password, &auth.user.password_hash)? {
        return Err(ApiError::Unauthorized("Wrong password".to_string()));
    }

    let password_hash = password::hash_password(&req.new_password)?;
    User::set_password(&state.db, auth.user.id, &password_hash).await?;

    let revoked = AuthToken::delete_all(&state.db, auth.user.id).await?;
    let authtoken = issue_token(&state, auth.user.id).await?;

    tracing::info!(user_id = auth.user.id, revoked, "Password changed, tokens rotated");

    Ok(Json(AuthResponse {
        id: auth.user.id,
        username: auth.user.username,
        authtoken,
    }))
}
