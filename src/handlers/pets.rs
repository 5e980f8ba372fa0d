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

/// Fields a listing owner may change through the general update endpoint.
/// Ownership and adoption state are managed by their own operations.
const UPDATE_FIELDS: &[&str] = &[
    "name",
    "age",
    "category",
    "location",
    "shortDescription",
    "longDescription",
    "image",
];

#[derive(Debug, Deserialize)]
pub struct PetListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub email: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn pet_filter(query: PetListQuery) -> FilterSpec {
    FilterSpec::new()
        .eq_opt("email", query.email)
        .contains_ci_opt("name", query.search)
        .eq_opt("category", query.category)
}

/// GET /pets - public browse listing: unadopted pets only, paginated.
pub async fn list_public(
    State(ctx): State<AppContext>,
    Query(query): Query<PetListQuery>,
) -> Result<Json<Value>, ApiError> {
    let pagination = Pagination::from_params(query.page.as_deref(), query.limit.as_deref());
    let spec = pet_filter(query).eq("adopted", false);

    let total = ctx
        .data
        .pets
        .count(spec.clone())
        .await
        .map_err(|e| ApiError::store("Failed to fetch pets", e))?;
    let pets = ctx
        .data
        .pets
        .find(spec.paginate(&pagination))
        .await
        .map_err(|e| ApiError::store("Failed to fetch pets", e))?;

    let has_more = pagination.has_more(pets.len(), total);
    Ok(Json(json!({
        "pets": to_values(&pets),
        "total": total,
        "hasMore": has_more,
    })))
}

/// GET /allpets - authenticated listing over the full dataset, no implicit
/// adopted restriction and no pagination.
pub async fn list_all(
    State(ctx): State<AppContext>,
    Query(query): Query<PetListQuery>,
) -> Result<Json<Value>, ApiError> {
    let pets = ctx
        .data
        .pets
        .find(pet_filter(query))
        .await
        .map_err(|e| ApiError::store("Failed to fetch pets", e))?;

    Ok(Json(Value::Array(to_values(&pets))))
}

/// GET /pets/:id - public lookup by the domain-level petId.
pub async fn get_by_pet_id(
    State(ctx): State<AppContext>,
    Path(pet_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let pet = ctx
        .data
        .pets
        .find_one(FilterSpec::new().eq("petId", pet_id))
        .await
        .map_err(|e| ApiError::store("Failed to fetch pet", e))?
        .ok_or_else(|| ApiError::not_found("Pet not found"))?;

    Ok(Json(pet.to_value()))
}

/// POST /pets - create a listing.
pub async fn create(
    State(ctx): State<AppContext>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let body = require_object(payload)?;
    let result = ctx
        .data
        .pets
        .insert_one(body)
        .await
        .map_err(|e| ApiError::store("Failed to add pet", e))?;

    Ok(Json(json!(result)))
}

/// PUT /pets/:id - whitelist-checked merge update, keyed by domain petId.
pub async fn update(
    State(ctx): State<AppContext>,
    Path(pet_id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let patch = whitelist_patch(payload, UPDATE_FIELDS)?;
    let result = ctx
        .data
        .pets
        .update_set(FilterSpec::new().eq("petId", pet_id), patch)
        .await
        .map_err(|e| ApiError::store("Update failed", e))?;

    Ok(Json(json!(result)))
}

/// PATCH /pets/:id/status - admin toggle of the adopted flag.
pub async fn set_status(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let adopted = payload
        .get("adopted")
        .and_then(Value::as_bool)
        .ok_or_else(|| ApiError::bad_request("adopted flag is required"))?;

    let mut patch = serde_json::Map::new();
    patch.insert("adopted".to_string(), json!(adopted));

    let result = ctx
        .data
        .pets
        .update_set(FilterSpec::new().id(id), patch)
        .await
        .map_err(|e| ApiError::store("Failed to toggle adopted status", e))?;

    Ok(Json(json!(result)))
}

/// PATCH /pets/:id/adopt - marks a listing adopted.
pub async fn adopt(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;

    let mut patch = serde_json::Map::new();
    patch.insert("adopted".to_string(), json!(true));

    let result = ctx
        .data
        .pets
        .update_set(FilterSpec::new().id(id), patch)
        .await
        .map_err(|e| ApiError::store("Failed to update pet status", e))?;

    Ok(Json(json!(result)))
}

/// DELETE /pets/:id - admin delete by opaque id.
pub async fn remove(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let result = ctx
        .data
        .pets
        .delete_many(FilterSpec::new().id(id))
        .await
        .map_err(|e| ApiError::store("Failed to delete pet", e))?;

    Ok(Json(json!(result)))
}
