//! Request extractors.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the acting user's name.
pub const ACTOR_HEADER: &str = "x-user";

const MAX_ACTOR_LEN: usize = 150;

/// Optional actor name taken from the `X-User` header.
///
/// There is no authentication: the value is recorded in `created_by` and
/// `updated_by` for attribution only. A missing or blank header yields `None`.
///
/// ```ignore
/// async fn handler(actor: Actor) -> impl IntoResponse {
///     let who = actor.into_inner();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor(pub Option<String>);

impl Actor {
    /// Returns the actor name, if any.
    #[must_use]
    pub fn into_inner(self) -> Option<String> {
        self.0
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let name = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| value.chars().take(MAX_ACTOR_LEN).collect());

        Ok(Self(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Actor {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("X-User", value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        Actor::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_reads_header() {
        assert_eq!(extract(Some("alice")).await, Actor(Some("alice".into())));
    }

    #[tokio::test]
    async fn test_missing_or_blank_header() {
        assert_eq!(extract(None).await, Actor(None));
        assert_eq!(extract(Some("   ")).await, Actor(None));
    }

    #[tokio::test]
    async fn test_long_names_are_truncated() {
        let long = "x".repeat(400);
        let actor = extract(Some(&long)).await;
        assert_eq!(actor.into_inner().map(|s| s.len()), Some(150));
    }
}
