use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::access::Decision;
use crate::pages::canonical_path;

use super::error::ApiError;
use super::state::AppState;

/// Applies the admin access gate before any route runs.
///
/// The decision is made on the canonical path, the same one page
/// resolution looks up, so encoded or redundant segments cannot reach an
/// admin page without passing the gate. Paths that cannot be canonicalized
/// are rejected with `400`.
pub async fn access_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let has_session = jar
        .get(&state.gate.session_cookie)
        .is_some_and(|cookie| !cookie.value().is_empty());
    let path = match canonical_path(request.uri().path()) {
        Ok(path) => path,
        Err(err) => {
            debug!(path = %request.uri().path(), error = %err, "rejecting malformed path");
            return ApiError::InvalidPath.into_response();
        }
    };

    match state.gate.decide(&path, has_session) {
        Decision::Allow => next.run(request).await,
        Decision::RedirectToLogin => {
            debug!(path = %path, "no session; redirecting to login");
            Redirect::temporary(&state.gate.login_path).into_response()
        }
        Decision::RedirectToDashboard => {
            debug!(path = %path, "session present; redirecting to dashboard");
            Redirect::temporary(&state.gate.dashboard_path).into_response()
        }
    }
}
