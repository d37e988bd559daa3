/// Authenticated-user extractor
///
/// The API authenticates every protected request with a custom scheme:
///
/// ```text
/// Authorization: LINKSTASH-TOKEN user=<decimal id> token=<opaque>
/// ```
///
/// `AuthUser` resolves that header to a database user before the handler
/// runs. Handlers declare it as a parameter, so a route that forgets
/// authentication simply does not receive a user. All failures produce the
/// same 401 so callers cannot probe which part was wrong.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use linkstash_shared::auth::token::digest_token;
use linkstash_shared::models::auth_token::AuthToken;
use linkstash_shared::models::user::User;

use crate::app::AppState;
use crate::error::ApiError;

const SCHEME: &str = "LINKSTASH-TOKEN";

/// The resolved identity of an authenticated request
pub struct AuthUser {
    /// The user the token belongs to
    pub user: User,

    /// Digest of the token the request authenticated with, kept so logout
    /// can revoke exactly this token
    pub token_digest: String,
}

/// Parses the credential fields out of an Authorization header value
///
/// Returns `(user_id, token)` or `None` for any malformation. Field order
/// is fixed: `user=` then `token=`.
pub fn parse_auth_header(value: &str) -> Option<(i64, &str)> {
    let rest = value.strip_prefix(SCHEME)?.strip_prefix(' ')?;

    let mut fields = rest.split(' ');
    let user_field = fields.next()?.strip_prefix("user=")?;
    let token = fields.next()?.strip_prefix("token=")?;
    if fields.next().is_some() || token.is_empty() {
        return None;
    }

    let user_id = user_field.parse::<i64>().ok()?;
    Some((user_id, token))
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized("Invalid or missing authentication token".to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(unauthorized)?;

        let (user_id, token) = parse_auth_header(header).ok_or_else(unauthorized)?;

        let token_digest = digest_token(token);
        let valid = AuthToken::exists(&state.db, user_id, &token_digest)
            .await
            .map_err(|err| ApiError::InternalError(format!("Token lookup failed: {}", err)))?;
        if !valid {
            return Err(unauthorized());
        }

        let user = User::find_by_id(&state.db, user_id)
            .await
            .map_err(|err| ApiError::InternalError(format!("User lookup failed: {}", err)))?
            .ok_or_else(unauthorized)?;

        Ok(AuthUser { user, token_digest })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_header() {
        let (id, token) = parse_auth_header("LINKSTASH-TOKEN user=42 token=abcDEF123").unwrap();
        assert_eq!(id, 42);
        assert_eq!(token, "abcDEF123");
    }

    #[test]
    fn test_parse_rejects_wrong_scheme() {
        assert!(parse_auth_header("Bearer abc").is_none());
        assert!(parse_auth_header("LINKSTASH user=1 token=x").is_none());
    }

    #[test]
    fn test_parse_rejects_malformed_id() {
        assert!(parse_auth_header("LINKSTASH-TOKEN user=abc token=x").is_none());
        assert!(parse_auth_header("LINKSTASH-TOKEN user= token=x").is_none());
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        assert!(parse_auth_header("LINKSTASH-TOKEN user=1").is_none());
        assert!(parse_auth_header("LINKSTASH-TOKEN token=x user=1").is_none());
        assert!(parse_auth_header("LINKSTASH-TOKEN user=1 token=").is_none());
        assert!(parse_auth_header("LINKSTASH-TOKEN").is_none());
    }

    #[test]
    fn test_parse_rejects_trailing_fields() {
        assert!(parse_auth_header("LINKSTASH-TOKEN user=1 token=x extra=y").is_none());
    }
}
