use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;

pub(crate) fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request(format!("Invalid id: {}", id)))
}

pub(crate) fn require_object(body: Value) -> Result<Map<String, Value>, ApiError> {
    body.as_object()
        .cloned()
        .ok_or_else(|| ApiError::bad_request("Expected a JSON object"))
}

/// Restricts a merge-update payload to the per-resource allowed field set.
/// Unknown or protected fields are rejected outright rather than written
/// verbatim onto the document.
pub(crate) fn whitelist_patch(
    body: Value,
    allowed: &[&str],
) -> Result<Map<String, Value>, ApiError> {
    let patch = require_object(body)?;

    if let Some(field) = patch.keys().find(|k| !allowed.contains(&k.as_str())) {
        return Err(ApiError::bad_request(format!(
            "Field '{}' cannot be updated",
            field
        )));
    }

    Ok(patch)
}
