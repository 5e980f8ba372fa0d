use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::error::ApiError;
use crate::filter::FilterSpec;
use crate::store::{to_values, Collection};

use super::utils::{parse_id, require_object};

#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    pub email: Option<String>,
    #[serde(rename = "donId")]
    pub don_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentDeleteQuery {
    pub email: Option<String>,
}

/// GET /donation-payments - payments filtered by payer and/or campaign.
pub async fn list(
    State(ctx): State<AppContext>,
    Query(query): Query<PaymentListQuery>,
) -> Result<Json<Value>, ApiError> {
    let payments = ctx
        .data
        .donation_payments
        .find(
            FilterSpec::new()
                .eq_opt("email", query.email)
                .eq_opt("donId", query.don_id),
        )
        .await
        .map_err(|e| ApiError::store("Failed to fetch donation payments", e))?;

    Ok(Json(Value::Array(to_values(&payments))))
}

/// POST /donation-payments - records a completed payment.
pub async fn create(
    State(ctx): State<AppContext>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let body = require_object(payload)?;
    let result = ctx
        .data
        .donation_payments
        .insert_one(body)
        .await
        .map_err(|e| ApiError::store("Failed to record donation payment", e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Donation payment recorded successfully",
            "insertedId": result.inserted_id,
        })),
    ))
}

/// DELETE /donation-payments/:id - refund request, restricted to the payer.
///
/// The delete predicate requires the stored payer email to equal the
/// caller-supplied one; a miss responds 404 without distinguishing "no such
/// payment" from "not yours", so existence never leaks.
pub async fn remove(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Query(query): Query<PaymentDeleteQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let email = query
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("Email is required."))?;

    let result = ctx
        .data
        .donation_payments
        .delete_many(FilterSpec::new().id(id).eq("email", email))
        .await
        .map_err(|e| ApiError::store("Failed to process refund", e))?;

    if result.deleted_count == 0 {
        return Err(ApiError::not_found("Donation not found or not authorized"));
    }

    Ok(Json(json!({
        "message": "Donation refund requested successfully",
    })))
}
