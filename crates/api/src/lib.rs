pub mod envelope;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/refresh", post(routes::auth::refresh))
        .route("/me", get(routes::auth::me));

    // Mobile surface: uniform envelope, transport status always 200
    let mobile_routes = Router::new()
        .route(
            "/attendance-request",
            get(routes::attendance::list).post(routes::attendance::create_or_update),
        )
        .route("/attendance-request/{request_id}", get(routes::attendance::get))
        .route(
            "/attendance-request/{request_id}/delete",
            post(routes::attendance::delete),
        )
        .route("/shift-type", get(routes::attendance::shift_types))
        .route("/device", post(routes::device::register));

    // Admin surface: role-gated, plain HTTP status codes
    let rule_routes = Router::new()
        .route("/", post(routes::rules::create))
        .route("/{rule_id}", get(routes::rules::get))
        .route("/{rule_id}", put(routes::rules::update))
        .route("/{rule_id}", delete(routes::rules::delete))
        .route(
            "/{rule_id}/documents-for-today",
            get(routes::rules::documents_for_today),
        );

    let push_routes = Router::new().route("/", post(routes::push::create));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/mobile/v1", mobile_routes)
        .nest("/notification-rule", rule_routes)
        .nest("/push-notification", push_routes);

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
