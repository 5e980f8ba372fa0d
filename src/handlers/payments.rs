use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::error::ApiError;
use crate::payment::PaymentGateway;

/// POST /create-payment-intent - bridges to the external payment processor
/// and hands the client secret back for the browser-side confirmation step.
pub async fn create_payment_intent(
    State(ctx): State<AppContext>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let amount = payload
        .get("amount")
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::bad_request("amount is required"))?;

    let client_secret = ctx
        .payments
        .create_payment_intent(amount)
        .await
        .map_err(|e| ApiError::upstream("Failed to create payment intent", e))?;

    Ok(Json(json!({ "clientSecret": client_secret })))
}
