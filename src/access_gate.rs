//! Middleware that rejects requests without a session cookie.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    Error,
    session::{SessionToken, resolve},
};

/// Check that the client presented a session token.
///
/// # Errors
///
/// Returns [Error::Unauthorized] if `token` is absent or empty.
pub fn check(token: Option<&SessionToken>) -> Result<(), Error> {
    match token {
        Some(token) if !token.is_empty() => Ok(()),
        _ => Err(Error::Unauthorized),
    }
}

/// Middleware function that checks for a session cookie.
///
/// The session token is placed into the request and the request executed
/// normally if the cookie is present, otherwise a 401 response is returned
/// and the route handler never runs.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(session): Extension<SessionToken>` to receive the session token.
pub async fn session_guard(request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = CookieJar::from_headers(&parts.headers);
    let token = resolve(&jar);

    if let Err(error) = check(token.as_ref()) {
        tracing::debug!("Rejected {} {}: no session cookie.", parts.method, parts.uri);
        return error.into_response();
    }

    if let Some(token) = token {
        parts.extensions.insert(token);
    }

    next.run(Request::from_parts(parts, body)).await
}
