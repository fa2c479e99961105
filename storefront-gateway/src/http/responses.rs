use axum::http::header::HeaderName;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub const CONTACT_SUCCESS_MESSAGE: &str = "Message sent to Vijay Brothers successfully!";

/// Marks responses served from fixture data instead of the backend.
pub const INTEGRATION_HEADER: &str = "x-integration";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: String,
}

#[derive(Debug, Serialize)]
pub struct ContactReply {
    pub success: bool,
    pub message: String,
}

impl ContactReply {
    pub fn sent() -> Self {
        Self {
            success: true,
            message: String::from(CONTACT_SUCCESS_MESSAGE),
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct CartItem {
    pub id: &'static str,
    pub name: &'static str,
    pub price: u64,
    pub quantity: u32,
    pub image: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInitiation {
    pub order_id: &'static str,
    pub amount: u64,
    pub currency: &'static str,
}

/// A response built from fixture data. Not yet backed by a backend endpoint.
#[derive(Debug)]
pub struct Placeholder<T>(pub T);

impl<T: IntoResponse> IntoResponse for Placeholder<T> {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        response
            .headers_mut()
            .insert(
            HeaderName::from_static(INTEGRATION_HEADER),
            HeaderValue::from_static("placeholder"),
        );
        response
    }
}

pub fn placeholder_cart() -> CartResponse {
    let item = CartItem {
        id: "1",
        name: "Kanjivaram Silk Saree",
        price: 4999,
        quantity: 1,
        image: "/images/sarees/kanjivaram-silk.jpg",
    };
    CartResponse {
        total: item.price * u64::from(item.quantity),
        items: vec![item],
    }
}

pub fn placeholder_order() -> OrderInitiation {
    OrderInitiation {
        order_id: "order_123456",
        amount: 50000,
        currency: "INR",
    }
}
