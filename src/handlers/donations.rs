use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::error::ApiError;
use crate::filter::{FilterSpec, Pagination};
use crate::store::{to_values, Collection};

use super::utils::{parse_id, require_object, whitelist_patch};

const UPDATE_FIELDS: &[&str] = &[
    "name",
    "image",
    "maxDonationAmount",
    "lastDate",
    "shortDescription",
    "longDescription",
];

#[derive(Debug, Deserialize)]
pub struct DonationListQuery {
    pub email: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// GET /donations/infinite - public paginated feed for infinite scrolling.
pub async fn list_infinite(
    State(ctx): State<AppContext>,
    Query(query): Query<DonationListQuery>,
) -> Result<Json<Value>, ApiError> {
    let pagination = Pagination::from_params(query.page.as_deref(), query.limit.as_deref());
    let spec = FilterSpec::new();

    let total = ctx
        .data
        .donations
        .count(spec.clone())
        .await
        .map_err(|e| ApiError::store("Failed to fetch donations", e))?;
    let donations = ctx
        .data
        .donations
        .find(spec.paginate(&pagination))
        .await
        .map_err(|e| ApiError::store("Failed to fetch donations", e))?;

    let has_more = pagination.has_more(donations.len(), total);
    Ok(Json(json!({
        "donations": to_values(&donations),
        "total": total,
        "hasMore": has_more,
    })))
}

/// GET /donations - public listing, optionally scoped to a campaign owner.
pub async fn list(
    State(ctx): State<AppContext>,
    Query(query): Query<DonationListQuery>,
) -> Result<Json<Value>, ApiError> {
    let donations = ctx
        .data
        .donations
        .find(FilterSpec::new().eq_opt("email", query.email))
        .await
        .map_err(|e| ApiError::store("Failed to fetch donations", e))?;

    Ok(Json(Value::Array(to_values(&donations))))
}

/// GET /donations/:id - public lookup by opaque id.
pub async fn get_by_id(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let donation = ctx
        .data
        .donations
        .find_one(FilterSpec::new().id(id))
        .await
        .map_err(|e| ApiError::store("Failed to fetch donation", e))?
        .ok_or_else(|| ApiError::not_found("Donation not found"))?;

    Ok(Json(donation.to_value()))
}

/// POST /donations - create a campaign.
pub async fn create(
    State(ctx): State<AppContext>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let body = require_object(payload)?;
    let result = ctx
        .data
        .donations
        .insert_one(body)
        .await
        .map_err(|e| ApiError::store("Failed to create donation campaign", e))?;

    Ok(Json(json!(result)))
}

/// PUT /donations/:id - whitelist-checked merge update.
pub async fn update(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let patch = whitelist_patch(payload, UPDATE_FIELDS)?;
    let result = ctx
        .data
        .donations
        .update_set(FilterSpec::new().id(id), patch)
        .await
        .map_err(|e| ApiError::store("Failed to update donation", e))?;

    Ok(Json(json!(result)))
}

/// PATCH /donations/:id - sets the campaign status.
pub async fn set_status(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let status = payload
        .get("donationStatus")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request("donationStatus is required"))?;

    let mut patch = serde_json::Map::new();
    patch.insert("donationStatus".to_string(), json!(status));

    let result = ctx
        .data
        .donations
        .update_set(FilterSpec::new().id(id), patch)
        .await
        .map_err(|e| ApiError::store("Failed to update donation", e))?;

    Ok(Json(json!(result)))
}

/// DELETE /donations/:id - admin delete by opaque id.
pub async fn remove(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let result = ctx
        .data
        .donations
        .delete_many(FilterSpec::new().id(id))
        .await
        .map_err(|e| ApiError::store("Failed to delete donation", e))?;

    Ok(Json(json!(result)))
}
