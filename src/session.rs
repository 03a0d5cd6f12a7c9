//! Session identity for anonymous clients.
//!
//! A session is nothing more than an opaque token the client keeps in the
//! `sessionId` cookie. The server keeps no record of sessions: a session
//! exists only as the set of transactions tagged with its token.

use std::{convert::Infallible, fmt::Display};

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

/// The name of the cookie that holds the session token.
pub const COOKIE_SESSION_ID: &str = "sessionId";
/// How long the client should keep the session cookie.
pub const SESSION_COOKIE_MAX_AGE: Duration = Duration::days(7);

/// An opaque token that correlates a client's transactions.
///
/// Tokens minted by the server are random UUIDs, but tokens presented by
/// clients are used verbatim and never validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Mint a new random token.
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ToSql for SessionToken {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for SessionToken {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(SessionToken)
    }
}

/// Get the session token the client presented, if any.
///
/// This is a plain lookup of the cookie value: nothing is validated,
/// generated or checked against the store.
pub(crate) fn resolve(jar: &CookieJar) -> Option<SessionToken> {
    jar.get(COOKIE_SESSION_ID)
        .map(|cookie| SessionToken::new(cookie.value_trimmed()))
}

/// Return `token` unchanged if it is present, otherwise mint a new one.
///
/// The returned flag is `true` when the token was newly minted, in which case
/// the caller is responsible for sending it back to the client with
/// [set_session_cookie]. An empty token is treated as absent.
pub(crate) fn ensure(token: Option<SessionToken>) -> (SessionToken, bool) {
    match token {
        Some(token) if !token.is_empty() => (token, false),
        _ => (SessionToken::generate(), true),
    }
}

/// Build the cookie that stores `token` on the client for [SESSION_COOKIE_MAX_AGE].
pub(crate) fn session_cookie(token: &SessionToken) -> Cookie<'static> {
    Cookie::build((COOKIE_SESSION_ID, token.to_string()))
        .path("/")
        .max_age(SESSION_COOKIE_MAX_AGE)
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Add the session cookie for `token` to the cookie jar.
///
/// Returns the cookie jar with the cookie added.
pub(crate) fn set_session_cookie(jar: CookieJar, token: &SessionToken) -> CookieJar {
    jar.add(session_cookie(token))
}

/// The session of the client making the current request.
///
/// Built once per request from the incoming cookies and handed to the
/// [LedgerService](crate::LedgerService) explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    /// The token from the `sessionId` cookie, `None` if the cookie was not sent.
    pub token: Option<SessionToken>,
}

impl SessionContext {
    /// A context for a request that carries `token`.
    pub fn with_token(token: SessionToken) -> Self {
        Self { token: Some(token) }
    }

    pub(crate) fn from_jar(jar: &CookieJar) -> Self {
        Self {
            token: resolve(jar),
        }
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        Ok(Self::from_jar(&jar))
    }
}
