#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use serde_json::{Map, Value};
use tower::ServiceExt;
use uuid::Uuid;

use pawhaven_api::app::app;
use pawhaven_api::auth::{mint_token, Claims, JwtVerifier};
use pawhaven_api::context::AppContext;
use pawhaven_api::payment::{PaymentError, PaymentGateway};
use pawhaven_api::store::{Collection, DataContext};

pub const TEST_SECRET: &str = "pawhaven-test-secret";

/// Gateway stub so payment-intent tests never leave the process.
pub struct StubGateway;

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_payment_intent(&self, amount: i64) -> Result<String, PaymentError> {
        Ok(format!("pi_test_{}_secret", amount))
    }
}

/// Router over an in-memory store plus the context for direct seeding.
pub fn test_app() -> (Router, AppContext) {
    let ctx = AppContext {
        data: DataContext::in_memory(),
        verifier: Arc::new(JwtVerifier::new(TEST_SECRET).expect("verifier")),
        payments: Arc::new(StubGateway),
    };
    (app(ctx.clone()), ctx)
}

pub fn token_for(email: &str) -> String {
    mint_token(&Claims::new(email), TEST_SECRET).expect("token")
}

pub fn token_without_email() -> String {
    mint_token(&Claims::anonymous(), TEST_SECRET).expect("token")
}

pub fn request(
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request")
}

pub async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("response")
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    }
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object")
}

pub async fn seed_user(ctx: &AppContext, email: &str, role: Option<&str>) -> Uuid {
    let mut body = Map::new();
    body.insert("email".to_string(), Value::String(email.to_string()));
    if let Some(role) = role {
        body.insert("role".to_string(), Value::String(role.to_string()));
    }
    ctx.data
        .users
        .insert_one(body)
        .await
        .expect("seed user")
        .inserted_id
}

pub async fn seed_admin(ctx: &AppContext, email: &str) -> Uuid {
    seed_user(ctx, email, Some("admin")).await
}

pub async fn seed_pet(ctx: &AppContext, doc: Value) -> Uuid {
    ctx.data
        .pets
        .insert_one(object(doc))
        .await
        .expect("seed pet")
        .inserted_id
}

pub async fn seed_donation(ctx: &AppContext, doc: Value) -> Uuid {
    ctx.data
        .donations
        .insert_one(object(doc))
        .await
        .expect("seed donation")
        .inserted_id
}

pub async fn seed_donation_payment(ctx: &AppContext, doc: Value) -> Uuid {
    ctx.data
        .donation_payments
        .insert_one(object(doc))
        .await
        .expect("seed donation payment")
        .inserted_id
}
