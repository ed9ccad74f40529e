use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use doctor_cell::router::doctor_routes;
use settings_cell::router::settings_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    // Doctor routes carry their own /doctors, /chambers and /schedules
    // prefixes because chambers and schedules are reached both ways.
    Router::new()
        .route("/", get(|| async { "Chamber booking API is running!" }))
        .merge(doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/settings", settings_routes(state))
}
