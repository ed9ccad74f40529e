use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_admin;

use crate::models::{BatchUpdateRequest, SettingRequest, SettingsQuery};
use crate::services::settings::SettingsService;

#[axum::debug_handler]
pub async fn list_settings(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<SettingsQuery>,
) -> Result<Json<Value>, AppError> {
    let settings_service = SettingsService::new(&state);

    let settings = settings_service.list_settings(query.group).await?;

    Ok(Json(Value::Object(settings)))
}

#[axum::debug_handler]
pub async fn get_setting(
    State(state): State<Arc<AppConfig>>,
    Path(key): Path<String>,
) -> Result<Json<Value>, AppError> {
    let settings_service = SettingsService::new(&state);

    let setting = settings_service.get_setting(&key).await?;

    Ok(Json(json!(setting)))
}

#[axum::debug_handler]
pub async fn upsert_setting(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<SettingRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&user)?;
    let settings_service = SettingsService::new(&state);

    let setting = settings_service
        .upsert_setting(request, auth.token())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Setting saved successfully",
            "setting": setting
        })),
    ))
}

#[axum::debug_handler]
pub async fn batch_update_settings(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BatchUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let settings_service = SettingsService::new(&state);

    let settings = settings_service
        .batch_update(request.settings, auth.token())
        .await?;

    Ok(Json(json!({
        "message": "Settings updated successfully",
        "settings": settings
    })))
}

#[axum::debug_handler]
pub async fn delete_setting(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(key): Path<String>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let settings_service = SettingsService::new(&state);

    settings_service.delete_setting(&key, auth.token()).await?;

    Ok(Json(json!({
        "message": "Setting deleted successfully"
    })))
}
