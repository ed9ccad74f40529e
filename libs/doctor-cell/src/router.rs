use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Routes for doctors, their categories, chambers and weekly schedules.
/// Reads are public; all writes sit behind the admin token check.
///
/// Routes sharing a path segment must use the same capture name, or the
/// merge panics at startup. The public detail handlers still accept a slug
/// in the `{doctor_id}` and `{category_id}` segments.
pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/doctors", get(handlers::list_doctors))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor))
        .route("/doctors/{doctor_id}/schedules", get(handlers::get_doctor_schedules))
        .route("/doctors/{doctor_id}/chambers", get(handlers::get_doctor_chambers))
        .route("/chambers/{chamber_id}/schedules", get(handlers::get_chamber_schedules))
        .route("/categories", get(handlers::list_categories))
        .route("/categories/{category_id}", get(handlers::get_category));

    let protected_routes = Router::new()
        .route("/doctors", post(handlers::create_doctor))
        .route("/doctors/{doctor_id}", put(handlers::update_doctor))
        .route("/doctors/{doctor_id}", delete(handlers::delete_doctor))
        .route("/doctors/{doctor_id}/chambers", post(handlers::create_chamber))
        .route("/chambers/{chamber_id}", put(handlers::update_chamber))
        .route("/chambers/{chamber_id}", delete(handlers::delete_chamber))
        .route("/doctors/{doctor_id}/schedules", post(handlers::create_schedule))
        .route("/schedules/{schedule_id}", put(handlers::update_schedule))
        .route("/schedules/{schedule_id}", delete(handlers::delete_schedule))
        .route("/categories", post(handlers::create_category))
        .route("/categories/{category_id}", put(handlers::update_category))
        .route("/categories/{category_id}", delete(handlers::delete_category))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
