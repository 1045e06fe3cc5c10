use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts};
use elibros_client::Auth;
use elibros_http::AppError;

/// Bearer token of the caller, forwarded verbatim to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn auth(&self) -> Auth<'_> {
        Auth::Bearer(&self.token)
    }

    fn from_parts(parts: &Parts) -> Option<Self> {
        let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
        let (scheme, token) = value.trim().split_once(' ')?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return None;
        }
        Some(Self::new(token))
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts).ok_or_else(|| AppError::unauthorized("Faça login para continuar"))
    }
}

/// `Option<Session>`: anonymous callers are welcome, a malformed header
/// counts as anonymous.
impl<S> OptionalFromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

/// `Auth` for an optional session.
pub fn auth_of(session: &Option<Session>) -> Auth<'_> {
    session.as_ref().map_or(Auth::Anonymous, Session::auth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::get("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn reads_bearer_tokens() {
        assert_eq!(Session::from_parts(&parts(Some("Bearer abc"))), Some(Session::new("abc")));
        assert_eq!(Session::from_parts(&parts(Some("bearer  xyz "))), Some(Session::new("xyz")));
    }

    #[test]
    fn rejects_other_schemes_and_blanks() {
        assert_eq!(Session::from_parts(&parts(None)), None);
        assert_eq!(Session::from_parts(&parts(Some("Basic abc"))), None);
        assert_eq!(Session::from_parts(&parts(Some("Bearer "))), None);
        assert_eq!(Session::from_parts(&parts(Some("abc"))), None);
    }

    #[test]
    fn optional_sessions_map_to_auth() {
        assert_eq!(auth_of(&None), Auth::Anonymous);
        assert_eq!(auth_of(&Some(Session::new("t"))), Auth::Bearer("t"));
    }
}
