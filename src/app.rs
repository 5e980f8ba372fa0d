use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{delete, get, patch, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::context::AppContext;
use crate::filter::FilterSpec;
use crate::handlers::{adoption_requests, donation_payments, donations, payments, pets, users};
use crate::middleware::{require_admin, require_auth};
use crate::store::Collection;

/// Assembles the full routing table over the given application context.
pub fn app(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(ctx.clone())
        .merge(pet_routes(ctx.clone()))
        .merge(donation_routes(ctx.clone()))
        .merge(donation_payment_routes(ctx.clone()))
        .merge(adoption_request_routes(ctx.clone()))
        .merge(user_routes(ctx.clone()))
        .merge(payment_routes(ctx))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn pet_routes(ctx: AppContext) -> Router {
    let public = Router::new()
        .route("/pets", get(pets::list_public))
        .route("/pets/:id", get(pets::get_by_pet_id));

    let authed = Router::new()
        .route("/allpets", get(pets::list_all))
        .route("/pets", post(pets::create))
        .route("/pets/:id", put(pets::update))
        .route("/pets/:id/adopt", patch(pets::adopt))
        .route_layer(from_fn_with_state(ctx.clone(), require_auth));

    let admin = Router::new()
        .route("/pets/:id/status", patch(pets::set_status))
        .route("/pets/:id", delete(pets::remove))
        .route_layer(from_fn_with_state(ctx.clone(), require_admin))
        .route_layer(from_fn_with_state(ctx.clone(), require_auth));

    public.merge(authed).merge(admin).with_state(ctx)
}

fn donation_routes(ctx: AppContext) -> Router {
    let public = Router::new()
        .route("/donations/infinite", get(donations::list_infinite))
        .route("/donations", get(donations::list))
        .route("/donations/:id", get(donations::get_by_id));

    let authed = Router::new()
        .route("/donations", post(donations::create))
        .route(
            "/donations/:id",
            put(donations::update).patch(donations::set_status),
        )
        .route_layer(from_fn_with_state(ctx.clone(), require_auth));

    let admin = Router::new()
        .route("/donations/:id", delete(donations::remove))
        .route_layer(from_fn_with_state(ctx.clone(), require_admin))
        .route_layer(from_fn_with_state(ctx.clone(), require_auth));

    public.merge(authed).merge(admin).with_state(ctx)
}

fn donation_payment_routes(ctx: AppContext) -> Router {
    Router::new()
        .route(
            "/donation-payments",
            get(donation_payments::list).post(donation_payments::create),
        )
        .route("/donation-payments/:id", delete(donation_payments::remove))
        .route_layer(from_fn_with_state(ctx.clone(), require_auth))
        .with_state(ctx)
}

fn adoption_request_routes(ctx: AppContext) -> Router {
    Router::new()
        .route(
            "/adoption-requests",
            get(adoption_requests::list).post(adoption_requests::create),
        )
        .route(
            "/adoption-requests/:id",
            get(adoption_requests::list_for_pet).patch(adoption_requests::set_status),
        )
        .route_layer(from_fn_with_state(ctx.clone(), require_auth))
        .with_state(ctx)
}

fn user_routes(ctx: AppContext) -> Router {
    let public = Router::new()
        .route("/users/role", get(users::role))
        .route("/users", post(users::register));

    let authed = Router::new()
        .route("/users", get(users::list))
        .route_layer(from_fn_with_state(ctx.clone(), require_auth));

    let admin = Router::new()
        .route("/users/role/:id", put(users::set_role))
        .route_layer(from_fn_with_state(ctx.clone(), require_admin))
        .route_layer(from_fn_with_state(ctx.clone(), require_auth));

    public.merge(authed).merge(admin).with_state(ctx)
}

fn payment_routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/create-payment-intent", post(payments::create_payment_intent))
        .with_state(ctx)
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "PawHaven API",
        "version": env!("CARGO_PKG_VERSION"),
        "message": "Pets are waiting for you",
    }))
}

async fn health(State(ctx): State<AppContext>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match ctx.data.users.count(FilterSpec::new()).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "error": e.to_string(),
            })),
        ),
    }
}
