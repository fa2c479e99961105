//! Forwards `/api/*` requests without a dedicated handler to the backend.

use axum::body::Body;
use axum::extract::rejection::{BytesRejection, FailedToBufferBody};
use axum::extract::State;
use axum::http::header::{
    ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, COOKIE, LOCATION,
    SET_COOKIE,
};
use axum::http::{HeaderMap, HeaderName, Method, Uri};
use axum::response::Response;
use bytes::Bytes;
use tracing::{debug, error, warn};

use crate::backend::BackendReply;

use super::error::ApiError;
use super::state::AppState;

const API_PREFIX: &str = "/api";

const FORWARDED_REQUEST_HEADERS: [HeaderName; 5] =
    [CONTENT_TYPE, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, COOKIE];

const RELAYED_RESPONSE_HEADERS: [HeaderName; 4] = [CONTENT_TYPE, SET_COOKIE, LOCATION, CACHE_CONTROL];

/// The body limit comes from the router's `DefaultBodyLimit`.
pub async fn forward_to_backend(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    request_headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();
    let query = uri.query();

    let body = body.map_err(|rejection| {
        warn!(path = %path, error = %rejection, "request body rejected");
        body_error(&rejection)
    })?;

    let mut headers = HeaderMap::new();
    for name in FORWARDED_REQUEST_HEADERS {
        for value in request_headers.get_all(&name) {
            headers.append(name.clone(), value.clone());
        }
    }

    let reply = state
        .backend
        .forward(method.clone(), &path, query, headers, body)
        .await
        .map_err(|e| {
            error!(method = %method, path = %path, error = %e, "upstream request failed");
            ApiError::Upstream
        })?;

    debug!(
        method = %method,
        path = %path,
        status = %reply.status,
        "request rewritten to backend"
    );
    Ok(relay(reply))
}

fn body_error(rejection: &BytesRejection) -> ApiError {
    match rejection {
        BytesRejection::FailedToBufferBody(FailedToBufferBody::LengthLimitError(_)) => {
            ApiError::PayloadTooLarge
        }
        _ => ApiError::InvalidBody(String::from("request body could not be read")),
    }
}

/// Builds a client response from a backend reply, keeping only the headers
/// that matter to the browser.
pub fn relay(reply: BackendReply) -> Response {
    let mut response = Response::new(Body::from(reply.body));
    *response.status_mut() = reply.status;
    for name in RELAYED_RESPONSE_HEADERS {
        for value in reply.headers.get_all(&name) {
            response.headers_mut().append(name.clone(), value.clone());
        }
    }
    response
}
