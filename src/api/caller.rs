// Caller identity from the `x-user-id` header.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::Error;

pub const USER_ID_HEADER: &str = "x-user-id";

fn header_user_id(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Extractor that requires a caller. Rejects with 401 `no user`.
#[derive(Debug, Clone)]
pub struct Caller(pub String);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_user_id(parts).map(Caller).ok_or(Error::MissingUser)
    }
}

/// Optional caller; never rejects.
#[derive(Debug, Clone)]
pub struct OptionalCaller(pub Option<String>);

impl<S> FromRequestParts<S> for OptionalCaller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalCaller(header_user_id(parts)))
    }
}

/// Header first, then the body's `user_id`, else a fresh UUIDv4.
pub fn resolve_caller(header: Option<String>, body_user_id: Option<String>) -> String {
    header
        .or_else(|| body_user_id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty()))
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/me/stats");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_caller_from_header() {
        let mut parts = parts_with(Some("  hunter-1 "));
        let Caller(id) = Caller::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(id, "hunter-1");
    }

    #[tokio::test]
    async fn test_blank_header_is_missing() {
        let mut parts = parts_with(Some("   "));
        let err = Caller::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, Error::MissingUser));

        let mut parts = parts_with(None);
        let OptionalCaller(id) = OptionalCaller::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(id.is_none());
    }

    #[test]
    fn test_resolve_caller_precedence() {
        assert_eq!(resolve_caller(Some("h".into()), Some("b".into())), "h");
        assert_eq!(resolve_caller(None, Some(" b ".into())), "b");
        let generated = resolve_caller(None, Some(String::new()));
        assert!(uuid::Uuid::parse_str(&generated).is_ok());
    }
}
