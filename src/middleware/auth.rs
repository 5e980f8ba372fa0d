use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::TokenVerifier;
use crate::context::AppContext;
use crate::error::ApiError;

/// Authenticated caller context extracted from a verified bearer token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub email: Option<String>,
}

/// Bearer-token authentication middleware.
///
/// A missing or malformed `Authorization` header short-circuits with 401
/// before any handler runs; a token the verifier rejects yields 403. On
/// success the decoded claims are attached to the request and the pipeline
/// continues. One verification attempt per request, no retries.
pub async fn require_auth(
    State(ctx): State<AppContext>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Unauthorized: No token provided"))?;

    let claims = ctx.verifier.verify(&token).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        ApiError::forbidden("Forbidden: Invalid token")
    })?;

    request.extensions_mut().insert(AuthUser {
        email: claims.email,
    });

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer abc.def.ghi")).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn rejects_missing_header() {
        assert!(extract_bearer_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        assert!(extract_bearer_token(&headers_with("Basic abc")).is_none());
    }

    #[test]
    fn rejects_empty_token() {
        assert!(extract_bearer_token(&headers_with("Bearer ")).is_none());
    }
}
