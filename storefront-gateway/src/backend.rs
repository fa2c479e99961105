//! Client for the storefront backend service.
//!
//! Every call is attempted exactly once. No retries, no backoff, no
//! redirect following; when no timeout is configured a hanging backend
//! stalls the caller.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid backend endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// Status, headers and body as returned by the backend.
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl BackendReply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("storefront-gateway/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `path` (and an optional raw query) to the base URL without
    /// dropping the base URL's own path segments.
    pub fn endpoint(&self, path: &str, query: Option<&str>) -> Result<Url, BackendError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let mut raw = format!("{base}/{path}");
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            raw.push('?');
            raw.push_str(query);
        }
        Url::parse(&raw).map_err(|e| BackendError::InvalidEndpoint {
            endpoint: raw.clone(),
            reason: e.to_string(),
        })
    }

    /// POSTs `body` as JSON to `path` under the base URL.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<BackendReply, BackendError> {
        let url = self.endpoint(path, None)?;
        debug!(url = %url, "posting to backend");
        let response = self.http.post(url.clone()).json(body).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "backend request failed");
            BackendError::Http(e)
        })?;
        read_reply(response).await
    }

    /// Sends an arbitrary request to `path` under the base URL.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<BackendReply, BackendError> {
        let url = self.endpoint(path, query)?;
        debug!(method = %method, url = %url, "forwarding to backend");
        let response = self
            .http
            .request(method, url.clone())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "backend request failed");
                BackendError::Http(e)
            })?;
        read_reply(response).await
    }
}

async fn read_reply(response: reqwest::Response) -> Result<BackendReply, BackendError> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?;
    debug!(status = %status, bytes = body.len(), "backend replied");
    Ok(BackendReply {
        status,
        headers,
        body,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use anyhow::Result;
    use reqwest::Url;

    use super::BackendClient;

    #[test]
    fn endpoint_keeps_base_path() -> Result<()> {
        let client = BackendClient::new(Url::parse("http://localhost:5000/api")?, None)?;
        assert_eq!(
            client.endpoint("/contact", None)?.as_str(),
            "http://localhost:5000/api/contact"
        );
        assert_eq!(
            client.endpoint("categories", Some("page=2"))?.as_str(),
            "http://localhost:5000/api/categories?page=2"
        );
        Ok(())
    }

    #[test]
    fn endpoint_handles_bare_host() -> Result<()> {
        let client = BackendClient::new(Url::parse("http://localhost:5000")?, None)?;
        assert_eq!(
            client.endpoint("/payments/verify", Some(""))?.as_str(),
            "http://localhost:5000/payments/verify"
        );
        Ok(())
    }
}
