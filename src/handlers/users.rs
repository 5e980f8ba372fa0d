use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::error::ApiError;
use crate::filter::FilterSpec;
use crate::store::{to_values, Collection, StoreError};

use super::utils::{parse_id, require_object};

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub email: Option<String>,
}

/// GET /users - authenticated listing, optionally filtered by email.
pub async fn list(
    State(ctx): State<AppContext>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Value>, ApiError> {
    let users = ctx
        .data
        .users
        .find(FilterSpec::new().eq_opt("email", query.email))
        .await
        .map_err(|e| ApiError::store("Failed to fetch users", e))?;

    Ok(Json(Value::Array(to_values(&users))))
}

/// GET /users/role - anonymous role lookup by email.
///
/// Missing records and records without a role both read as "user", so the
/// client can render conditionally without an account existing yet.
pub async fn role(
    State(ctx): State<AppContext>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Value>, ApiError> {
    let email = query
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("Email is required."))?;

    let user = ctx
        .data
        .users
        .find_one(FilterSpec::new().eq("email", email))
        .await
        .map_err(|e| ApiError::store("Failed to fetch user role", e))?;

    let role = user
        .as_ref()
        .and_then(|u| u.field_str("role"))
        .unwrap_or("user");

    Ok(Json(json!({ "role": role })))
}

/// POST /users - idempotent registration. A duplicate email is a 200 no-op,
/// not an error, whether caught by the pre-check or the unique index.
pub async fn register(
    State(ctx): State<AppContext>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let body = require_object(payload)?;
    let email = body
        .get("email")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request("Email is required."))?
        .to_string();

    let existing = ctx
        .data
        .users
        .find_one(FilterSpec::new().eq("email", email))
        .await
        .map_err(|e| ApiError::store("Failed to register user", e))?;

    if existing.is_some() {
        return Ok(Json(json!({
            "message": "User Already Exists",
            "inserted": false,
        })));
    }

    match ctx.data.users.insert_one(body).await {
        Ok(result) => Ok(Json(json!({
            "insertedId": result.inserted_id,
            "inserted": true,
        }))),
        Err(StoreError::Duplicate(_)) => Ok(Json(json!({
            "message": "User Already Exists",
            "inserted": false,
        }))),
        Err(e) => Err(ApiError::store("Failed to register user", e)),
    }
}

/// PUT /users/role/:id - admin role assignment by opaque id.
pub async fn set_role(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let role = payload
        .get("role")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request("role is required"))?;

    let mut patch = serde_json::Map::new();
    patch.insert("role".to_string(), json!(role));

    let result = ctx
        .data
        .users
        .update_set(FilterSpec::new().id(id), patch)
        .await
        .map_err(|e| ApiError::store("Failed to update user role", e))?;

    Ok(Json(json!(result)))
}
