//! Rutas HTTP
//!
//! Cada módulo expone un `Router<AppState>` que se anida bajo `/api`.

pub mod assignment_routes;
pub mod fleet_routes;
pub mod schedule_routes;
pub mod trip_routes;

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::{cors_middleware, cors_middleware_with_origins};
use crate::state::AppState;

/// Router completo de la aplicación con CORS y trazas
pub fn create_app_router(state: AppState) -> Router {
    let cors = if state.config.cors_origins.is_empty() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(state.config.cors_origins.clone())
    };

    Router::new()
        .route("/health", get(health))
        .nest("/api/trips", trip_routes::create_trip_router())
        .nest("/api/schedules", schedule_routes::create_schedule_router())
        .nest("/api/assignments", assignment_routes::create_assignment_router())
        .nest("/api/fleet", fleet_routes::create_fleet_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "environment": state.config.environment.as_str(),
        "storage": state.config.storage_backend.as_str(),
        "timestamp": state.clock.now().to_rfc3339(),
    }))
}
