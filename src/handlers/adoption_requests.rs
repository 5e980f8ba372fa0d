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
use crate::store::{to_values, Collection, StoreError};

use super::utils::{parse_id, require_object};

const ALREADY_SUBMITTED: &str = "You've already submitted an adoption request for this pet.";

#[derive(Debug, Deserialize)]
pub struct RequestListQuery {
    pub email: Option<String>,
    pub status: Option<String>,
}

/// GET /adoption-requests - requests scoped to a pet owner and/or status.
pub async fn list(
    State(ctx): State<AppContext>,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<Value>, ApiError> {
    let requests = ctx
        .data
        .adoption_requests
        .find(
            FilterSpec::new()
                .eq_opt("petOwnerEmail", query.email)
                .eq_opt("reqStatus", query.status),
        )
        .await
        .map_err(|e| ApiError::store("Failed to load adoption requests", e))?;

    Ok(Json(Value::Array(to_values(&requests))))
}

/// GET /adoption-requests/:id - every request made for one pet, by petId.
pub async fn list_for_pet(
    State(ctx): State<AppContext>,
    Path(pet_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let requests = ctx
        .data
        .adoption_requests
        .find(FilterSpec::new().eq("petId", pet_id))
        .await
        .map_err(|e| ApiError::store("Failed to load adoption requests", e))?;

    Ok(Json(Value::Array(to_values(&requests))))
}

/// POST /adoption-requests - submits a request, at most one per
/// (pet, requester) pair.
///
/// The pre-insert existence check gives the friendly conflict answer; the
/// store's unique index is the authoritative guard when two identical
/// submissions race past the check.
pub async fn create(
    State(ctx): State<AppContext>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let body = require_object(payload)?;

    let pet_id = body
        .get("petId")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request("petId is required"))?;
    let requester = body
        .get("adoptedReqByEmail")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request("adoptedReqByEmail is required"))?;

    let existing = ctx
        .data
        .adoption_requests
        .find_one(
            FilterSpec::new()
                .eq("petId", pet_id)
                .eq("adoptedReqByEmail", requester),
        )
        .await
        .map_err(|e| ApiError::store("Failed to record request", e))?;

    if existing.is_some() {
        return Err(ApiError::conflict(ALREADY_SUBMITTED));
    }

    let result = match ctx.data.adoption_requests.insert_one(body).await {
        Ok(result) => result,
        Err(StoreError::Duplicate(_)) => return Err(ApiError::conflict(ALREADY_SUBMITTED)),
        Err(e) => return Err(ApiError::store("Failed to record request", e)),
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Request recorded successfully",
            "insertedId": result.inserted_id,
        })),
    ))
}

/// PATCH /adoption-requests/:id - owner decision on a request.
pub async fn set_status(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request("status is required"))?;

    let mut patch = serde_json::Map::new();
    patch.insert("reqStatus".to_string(), json!(status));

    let result = ctx
        .data
        .adoption_requests
        .update_set(FilterSpec::new().id(id), patch)
        .await
        .map_err(|e| ApiError::store("Failed to update request", e))?;

    Ok(Json(json!(result)))
}
