use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use super::AppState;
use crate::error::PusherError;

/// The user behind the request's `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = PusherError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(PusherError::Unauthorized)?;
        let user_id = state
            .store
            .user_for_token(token)
            .await?
            .ok_or(PusherError::Unauthorized)?;
        Ok(CurrentUser(user_id))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    Some(token.trim()).filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(authorization: &str) -> Parts {
        Request::builder()
            .header(header::AUTHORIZATION, authorization)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn scheme_is_case_insensitive() {
        for value in ["Bearer abc", "bearer abc", "BEARER abc"] {
            assert_eq!(bearer_token(&parts_with(value)), Some("abc"), "{value}");
        }
    }

    #[test]
    fn other_schemes_and_empty_tokens_are_ignored() {
        assert_eq!(bearer_token(&parts_with("Basic OnBhdA==")), None);
        assert_eq!(bearer_token(&parts_with("Bearer   ")), None);
        assert_eq!(bearer_token(&parts_with("Bearerabc")), None);
    }
}
