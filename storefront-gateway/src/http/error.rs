use axum::http::header::ALLOW;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::pages::PageError;

use super::responses::ContactReply;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("method not allowed")]
    MethodNotAllowed(Method),
    #[error("{0}")]
    InvalidBody(String),
    #[error("invalid path")]
    InvalidPath,
    #[error("not found")]
    NotFound,
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("Failed to send message")]
    ContactFailed(StatusCode),
    #[error("Payment verification failed")]
    PaymentVerificationFailed,
    #[error("upstream request failed")]
    Upstream,
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidBody(_) | ApiError::InvalidPath => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ContactFailed(status) => *status,
            ApiError::PaymentVerificationFailed | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Upstream => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = match &self {
            ApiError::ContactFailed(_) => {
                (status, Json(ContactReply::failure(self.to_string()))).into_response()
            }
            _ => {
                let body = Json(serde_json::json!({ "error": self.to_string() }));
                (status, body).into_response()
            }
        };
        if let ApiError::MethodNotAllowed(allowed) = &self {
            if let Ok(value) = HeaderValue::from_str(allowed.as_str()) {
                response.headers_mut().insert(ALLOW, value);
            }
        }
        response
    }
}

impl From<PageError> for ApiError {
    fn from(error: PageError) -> Self {
        match error {
            PageError::InvalidPath => ApiError::InvalidPath,
            PageError::NotFound => ApiError::NotFound,
            PageError::Io(_) | PageError::HeaderValue(_) => ApiError::Internal,
        }
    }
}
