use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment processor request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment processor returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Payment processor response missing client secret")]
    MissingClientSecret,
}

/// Payment-intent creation boundary. One operation: amount in, client secret
/// out. No amount validation and no idempotency key; repeated calls create
/// distinct intents.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(&self, amount: i64) -> Result<String, PaymentError>;
}

/// Stripe-backed gateway speaking the form-encoded payment-intents API.
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    currency: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            currency: currency.into(),
            api_base: config::config().stripe.api_base.clone(),
        }
    }

    pub fn from_config() -> Self {
        let stripe = &config::config().stripe;
        Self::new(stripe.secret_key.clone(), stripe.currency.clone())
    }
}

#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    client_secret: Option<String>,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(&self, amount: i64) -> Result<String, PaymentError> {
        let params = [
            ("amount", amount.to_string()),
            ("currency", self.currency.clone()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Upstream { status, body });
        }

        let intent: PaymentIntentResponse = response.json().await?;
        intent
            .client_secret
            .ok_or(PaymentError::MissingClientSecret)
    }
}
