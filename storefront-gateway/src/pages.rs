//! Serves the pre-built storefront pages from the site root.
//!
//! `/cart` resolves to `cart`, `cart.html` or `cart/index.html`, in that
//! order; `/` resolves to `index.html`.

use std::path::{Component, Path, PathBuf};

use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;
use percent_encoding::percent_decode_str;
use thiserror::Error;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

const INDEX_FILE: &str = "index.html";

#[derive(Debug, Error)]
pub enum PageError {
    #[error("invalid path")]
    InvalidPath,
    #[error("page not found")]
    NotFound,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid header value")]
    HeaderValue(#[from] axum::http::header::InvalidHeaderValue),
}

pub fn sanitize_relative_path(requested_path: &str) -> Result<PathBuf, PageError> {
    let requested = Path::new(requested_path.trim_start_matches('/'));
    let mut sanitized = PathBuf::new();

    for component in requested.components() {
        match component {
            Component::Normal(part) => sanitized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(PageError::InvalidPath);
            }
        }
    }

    Ok(sanitized)
}

/// Percent-decodes a raw URL path and sanitizes it into a relative path.
/// Empty and `.` segments disappear; `..` is rejected.
pub fn decode_request_path(url_path: &str) -> Result<PathBuf, PageError> {
    let decoded = percent_decode_str(url_path)
        .decode_utf8()
        .map_err(|_| PageError::InvalidPath)?;
    sanitize_relative_path(&decoded)
}

/// The path that page resolution will actually look up, in URL form:
/// `//%61dmin/./dashboard/` becomes `/admin/dashboard`.
pub fn canonical_path(url_path: &str) -> Result<String, PageError> {
    let relative = decode_request_path(url_path)?;
    let mut canonical = String::from("/");
    for (index, component) in relative.components().enumerate() {
        if index > 0 {
            canonical.push('/');
        }
        canonical.push_str(&component.as_os_str().to_string_lossy());
    }
    Ok(canonical)
}

/// Maps a raw (percent-encoded) URL path to a file path relative to the site root.
pub async fn resolve_page(root: &Path, url_path: &str) -> Result<PathBuf, PageError> {
    let relative = decode_request_path(url_path)?;

    if relative.as_os_str().is_empty() {
        return existing_file(root, PathBuf::from(INDEX_FILE)).await;
    }

    let mut with_html = relative.clone().into_os_string();
    with_html.push(".html");
    let candidates = [
        relative.clone(),
        PathBuf::from(with_html),
        relative.join(INDEX_FILE),
    ];

    for candidate in candidates {
        if let Ok(found) = existing_file(root, candidate).await {
            return Ok(found);
        }
    }

    Err(PageError::NotFound)
}

async fn existing_file(root: &Path, relative: PathBuf) -> Result<PathBuf, PageError> {
    match tokio::fs::metadata(root.join(&relative)).await {
        Ok(meta) if meta.is_file() => Ok(relative),
        _ => Err(PageError::NotFound),
    }
}

pub async fn serve_page(root: &Path, url_path: &str) -> Result<Response, PageError> {
    let relative = resolve_page(root, url_path).await?;
    let path = root.join(&relative);
    let file = File::open(&path).await.map_err(|e| {
        warn!(path = %relative.display(), error = %e, "page could not be opened");
        PageError::NotFound
    })?;
    let size = file.metadata().await?.len();

    debug!(path = %relative.display(), size, "serving page");

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    *response.status_mut() = StatusCode::OK;
    response
        .headers_mut()
        .insert(CONTENT_LENGTH, HeaderValue::from_str(&size.to_string())?);

    let content_type = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_str(&content_type)?);

    Ok(response)
}
