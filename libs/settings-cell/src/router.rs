use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn settings_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::list_settings))
        .route("/{key}", get(handlers::get_setting));

    let protected_routes = Router::new()
        .route("/", post(handlers::upsert_setting))
        .route("/batch", put(handlers::batch_update_settings))
        .route("/{key}", delete(handlers::delete_setting))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
