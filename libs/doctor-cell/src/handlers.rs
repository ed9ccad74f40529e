use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_admin;

use crate::models::{
    CategoryDetail, CategoryRequest, ChamberRequest, CreateDoctorRequest, CreateScheduleRequest,
    DoctorDetail, DoctorSearchQuery, UpdateDoctorRequest, UpdateScheduleRequest,
};
use crate::services::{
    category::CategoryService, chamber::ChamberService, doctor::DoctorService,
    schedule::ScheduleService,
};

async fn resolve_doctor(
    service: &DoctorService,
    id_or_slug: &str,
) -> Result<DoctorDetail, AppError> {
    let detail = match Uuid::parse_str(id_or_slug) {
        Ok(id) => service.get_doctor(id).await?,
        Err(_) => service.get_doctor_by_slug(id_or_slug).await?,
    };
    Ok(detail)
}

async fn resolve_category(
    service: &CategoryService,
    id_or_slug: &str,
) -> Result<CategoryDetail, AppError> {
    let detail = match Uuid::parse_str(id_or_slug) {
        Ok(id) => service.get_category(id).await?,
        Err(_) => service.get_category_by_slug(id_or_slug).await?,
    };
    Ok(detail)
}

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctors = doctor_service.search_doctors(query).await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

/// Doctor detail lookup. Accepts either the record id or the URL slug, since
/// public profile pages link by slug.
#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(id_or_slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let detail = resolve_doctor(&doctor_service, &id_or_slug).await?;

    Ok(Json(json!({ "doctor": detail })))
}

#[axum::debug_handler]
pub async fn get_doctor_schedules(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let schedule_service = ScheduleService::new(&state);

    let schedules = schedule_service.list_for_doctor(doctor_id).await?;

    Ok(Json(json!({ "schedules": schedules })))
}

#[axum::debug_handler]
pub async fn get_doctor_chambers(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let chamber_service = ChamberService::new(&state);

    let chambers = chamber_service.list_for_doctor(doctor_id).await?;

    Ok(Json(json!({ "chambers": chambers })))
}

#[axum::debug_handler]
pub async fn get_chamber_schedules(
    State(state): State<Arc<AppConfig>>,
    Path(chamber_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let schedule_service = ScheduleService::new(&state);

    let schedules = schedule_service.list_for_chamber(chamber_id).await?;

    Ok(Json(json!({ "schedules": schedules })))
}

#[axum::debug_handler]
pub async fn list_categories(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let category_service = CategoryService::new(&state);

    let categories = category_service.list_categories().await?;

    Ok(Json(json!({ "categories": categories })))
}

/// Category detail lookup. Accepts either the record id or the URL slug.
#[axum::debug_handler]
pub async fn get_category(
    State(state): State<Arc<AppConfig>>,
    Path(id_or_slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let category_service = CategoryService::new(&state);

    let detail = resolve_category(&category_service, &id_or_slug).await?;

    Ok(Json(json!({ "category": detail })))
}

// ==============================================================================
// ADMIN HANDLERS (AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&user)?;
    let doctor_service = DoctorService::new(&state);

    let doctor = doctor_service.create_doctor(request, auth.token()).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Doctor profile created successfully",
            "doctor": doctor
        })),
    ))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(doctor_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let doctor_service = DoctorService::new(&state);

    let doctor = doctor_service
        .update_doctor(doctor_id, request, auth.token())
        .await?;

    Ok(Json(json!({
        "message": "Doctor profile updated successfully",
        "doctor": doctor
    })))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(doctor_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let doctor_service = DoctorService::new(&state);

    doctor_service.delete_doctor(doctor_id, auth.token()).await?;

    Ok(Json(json!({
        "message": "Doctor profile deleted successfully"
    })))
}

#[axum::debug_handler]
pub async fn create_category(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&user)?;
    let category_service = CategoryService::new(&state);

    let category = category_service.create_category(request, auth.token()).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Category created successfully",
            "category": category
        })),
    ))
}

#[axum::debug_handler]
pub async fn update_category(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(category_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let category_service = CategoryService::new(&state);

    let category = category_service
        .update_category(category_id, request, auth.token())
        .await?;

    Ok(Json(json!({
        "message": "Category updated successfully",
        "category": category
    })))
}

#[axum::debug_handler]
pub async fn delete_category(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(category_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let category_service = CategoryService::new(&state);

    category_service
        .delete_category(category_id, auth.token())
        .await?;

    Ok(Json(json!({
        "message": "Category deleted successfully"
    })))
}

#[axum::debug_handler]
pub async fn create_chamber(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(doctor_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<ChamberRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&user)?;
    let chamber_service = ChamberService::new(&state);

    let chamber = chamber_service
        .create_chamber(doctor_id, request, auth.token())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Chamber created successfully",
            "chamber": chamber
        })),
    ))
}

#[axum::debug_handler]
pub async fn update_chamber(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(chamber_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<ChamberRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let chamber_service = ChamberService::new(&state);

    let chamber = chamber_service
        .update_chamber(chamber_id, request, auth.token())
        .await?;

    Ok(Json(json!({
        "message": "Chamber updated successfully",
        "chamber": chamber
    })))
}

#[axum::debug_handler]
pub async fn delete_chamber(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(chamber_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let chamber_service = ChamberService::new(&state);

    chamber_service
        .delete_chamber(chamber_id, auth.token())
        .await?;

    Ok(Json(json!({
        "message": "Chamber deleted successfully"
    })))
}

#[axum::debug_handler]
pub async fn create_schedule(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(doctor_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&user)?;
    let schedule_service = ScheduleService::new(&state);

    let schedule = schedule_service
        .create_schedule(doctor_id, request, auth.token())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Schedule created successfully",
            "schedule": schedule
        })),
    ))
}

#[axum::debug_handler]
pub async fn update_schedule(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(schedule_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let schedule_service = ScheduleService::new(&state);

    let schedule = schedule_service
        .update_schedule(schedule_id, request, auth.token())
        .await?;

    Ok(Json(json!({
        "message": "Schedule updated successfully",
        "schedule": schedule
    })))
}

#[axum::debug_handler]
pub async fn delete_schedule(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(schedule_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let schedule_service = ScheduleService::new(&state);

    schedule_service
        .delete_schedule(schedule_id, auth.token())
        .await?;

    Ok(Json(json!({
        "message": "Schedule deleted successfully"
    })))
}
