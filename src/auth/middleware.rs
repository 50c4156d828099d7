use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::app::AppState;
use crate::auth::models::AuthenticatedUser;
use crate::error::AppError;

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// A missing header, another scheme, or an empty token are all rejected as
/// forbidden, which is what the front end expects from the admin endpoint.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Forbidden("Missing bearer token".into()))?
        .to_str()
        .map_err(|_| AppError::Forbidden("Malformed authorization header".into()))?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .ok_or_else(|| AppError::Forbidden("Authorization scheme must be Bearer".into()))?;

    if token.is_empty() {
        return Err(AppError::Forbidden("Missing bearer token".into()));
    }

    Ok(token)
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = bearer_token(&parts.headers)
            .and_then(|token| state.jwt.verify(token))
            .inspect_err(|e| tracing::debug!("Rejected bearer token: {e}"))?;

        Ok(claims.into())
    }
}

/// An authenticated caller holding the `admin` or `super-admin` role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            tracing::debug!(user_id = %user.user_id, role = %user.role, "Non-admin caller rejected");
            return Err(AppError::Forbidden("Admin role required".into()));
        }

        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_ok() {
        let h = headers("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&h).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_bearer_token_missing() {
        let empty = HeaderMap::new();
        let result = bearer_token(&empty);
        match result {
            Err(AppError::Forbidden(msg)) => assert!(msg.contains("Missing")),
            other => panic!("Expected Forbidden error, got: {:?}", other),
        }
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        assert!(bearer_token(&headers("Basic dXNlcjpwYXNz")).is_err());
    }

    #[test]
    fn test_bearer_token_empty() {
        assert!(bearer_token(&headers("Bearer ")).is_err());
    }
}
