//! Typed request bodies. Each is validated before anything is forwarded.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::ApiError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("email address is invalid")]
    InvalidEmail,
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// JSON body that has been deserialized and validated. Any failure is a 400.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
        value
            .validate()
            .map_err(|error| ApiError::InvalidBody(error.to_string()))?;
        Ok(Self(value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub contact_no: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

impl Validate for ContactMessage {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("message", &self.message)?;
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(ValidationError::InvalidEmail),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub razorpay_payment_id: String,
    pub razorpay_order_id: String,
    pub razorpay_signature: String,
}

impl Validate for PaymentVerification {
    fn validate(&self) -> Result<(), ValidationError> {
        require("razorpay_payment_id", &self.razorpay_payment_id)?;
        require("razorpay_order_id", &self.razorpay_order_id)?;
        require("razorpay_signature", &self.razorpay_signature)
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Missing(field))
    } else {
        Ok(())
    }
}
