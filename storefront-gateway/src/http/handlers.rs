use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::HeaderName;
use axum::http::{Method, StatusCode, Uri};
use axum::middleware::from_fn_with_state;
use axum::response::Response;
use axum::routing::{any, get, post};
use axum::{Json, Router};
use tower_governor::{
    governor::GovernorConfigBuilder,
    key_extractor::SmartIpKeyExtractor,
    GovernorLayer,
};
use tracing::{debug, error, info, warn};

use crate::pages::serve_page;

use super::error::ApiError;
use super::gate::access_gate;
use super::requests::{ContactMessage, PaymentVerification, ValidJson};
use super::responses::{
    placeholder_cart, placeholder_order, CartResponse, ContactReply, HealthResponse,
    OrderInitiation, Placeholder,
};
use super::rewrite::{forward_to_backend, relay};
use super::state::AppState;

const CONTACT_ENDPOINT: &str = "/contact";
const PAYMENT_VERIFY_ENDPOINT: &str = "/payments/verify";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds the gateway router.
///
/// Clients are rate limited per IP: `X-Forwarded-For`, `X-Real-IP` or
/// `Forwarded` when a proxy sets them, the peer address otherwise.
pub fn router(state: AppState) -> Router {
    #[allow(clippy::expect_used)]
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .period(state.rate_limit.replenish_period())
            .burst_size(state.rate_limit.burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("rate limit values are clamped to at least 1"),
    );

    Router::new()
        .route("/health", get(health))
        .route("/api/contact", post(contact).fallback(post_only))
        .route("/api/payments/verify", post(verify_payment).fallback(post_only))
        .route("/api/payments/key", get(payment_key).fallback(get_only))
        .route("/api/orders/initiate", post(initiate_order).fallback(post_only))
        .route("/api/cart", any(cart))
        .route("/api", any(forward_to_backend))
        .route("/api/", any(forward_to_backend))
        .route("/api/{*rest}", any(forward_to_backend))
        .fallback(page)
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(from_fn_with_state(state.clone(), access_gate))
        .layer(GovernorLayer::new(governor_conf))
        .layer(tower_http::request_id::PropagateRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
        ))
        .layer(tower_http::request_id::SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            tower_http::request_id::MakeRequestUuid,
        ))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.backend.base_url().to_string(),
    })
}

async fn post_only() -> ApiError {
    ApiError::MethodNotAllowed(Method::POST)
}

async fn get_only() -> ApiError {
    ApiError::MethodNotAllowed(Method::GET)
}

async fn contact(
    State(state): State<AppState>,
    ValidJson(message): ValidJson<ContactMessage>,
) -> Result<Json<ContactReply>, ApiError> {
    match state.backend.post_json(CONTACT_ENDPOINT, &message).await {
        Ok(reply) if reply.is_success() => {
            info!(status = %reply.status, "contact message delivered");
            Ok(Json(ContactReply::sent()))
        }
        Ok(reply) => {
            warn!(status = %reply.status, "backend rejected contact message");
            Err(ApiError::ContactFailed(failure_status(reply.status)))
        }
        Err(err) => {
            error!(error = %err, "contact message could not be delivered");
            Err(ApiError::ContactFailed(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

/// Mirrors backend error statuses; anything else that is not a success
/// becomes a 500.
fn failure_status(status: StatusCode) -> StatusCode {
    if status.is_client_error() || status.is_server_error() {
        status
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn verify_payment(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<PaymentVerification>,
) -> Result<Response, ApiError> {
    let reply = state
        .backend
        .post_json(PAYMENT_VERIFY_ENDPOINT, &payload)
        .await
        .map_err(|err| {
            error!(
                order_id = %payload.razorpay_order_id,
                error = %err,
                "payment verification request failed"
            );
            ApiError::PaymentVerificationFailed
        })?;

    if !reply.is_success() {
        error!(
            order_id = %payload.razorpay_order_id,
            status = %reply.status,
            "backend rejected payment verification"
        );
        return Err(ApiError::PaymentVerificationFailed);
    }

    info!(order_id = %payload.razorpay_order_id, "payment verified");
    Ok(relay(reply))
}

async fn cart() -> Placeholder<Json<CartResponse>> {
    debug!("serving placeholder cart");
    Placeholder(Json(placeholder_cart()))
}

async fn initiate_order() -> Placeholder<Json<OrderInitiation>> {
    debug!("serving placeholder order initiation");
    Placeholder(Json(placeholder_order()))
}

async fn payment_key(State(state): State<AppState>) -> Placeholder<String> {
    debug!("serving payment key");
    Placeholder(state.payment_key.to_string())
}

async fn page(State(state): State<AppState>, method: Method, uri: Uri) -> Result<Response, ApiError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(ApiError::MethodNotAllowed(Method::GET));
    }
    let response = serve_page(&state.site_root, uri.path()).await.map_err(|err| {
        debug!(path = %uri.path(), error = %err, "page not served");
        ApiError::from(err)
    })?;
    Ok(response)
}
