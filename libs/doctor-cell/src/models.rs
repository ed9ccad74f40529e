use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Day a weekly schedule applies to. Stored lowercase in the database and
/// compared case-insensitively against incoming day names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub fn from_date(date: NaiveDate) -> Self {
        use chrono::Datelike;
        match date.weekday() {
            chrono::Weekday::Sun => DayOfWeek::Sunday,
            chrono::Weekday::Mon => DayOfWeek::Monday,
            chrono::Weekday::Tue => DayOfWeek::Tuesday,
            chrono::Weekday::Wed => DayOfWeek::Wednesday,
            chrono::Weekday::Thu => DayOfWeek::Thursday,
            chrono::Weekday::Fri => DayOfWeek::Friday,
            chrono::Weekday::Sat => DayOfWeek::Saturday,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "sunday",
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Medical specialty grouping for doctors (cardiology, dermatology, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub photo: Option<String>,
    pub bio: Option<String>,
    pub gender: Gender,
    pub experience_years: i32,
    pub degrees: Vec<String>,
    pub certifications: Option<Vec<String>>,
    pub category_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chamber {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub name: String,
    pub address: String,
    pub contact_number: String,
    pub google_maps_link: Option<String>,
    pub is_primary: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub chamber_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_patients: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category with the doctors filed under it, returned by the public
/// category detail endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub doctors: Vec<Doctor>,
}

/// Doctor profile with its related records, returned by the public
/// doctor detail endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorDetail {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub chambers: Vec<Chamber>,
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub bio: Option<String>,
    pub gender: Gender,
    pub experience_years: i32,
    pub degrees: Vec<String>,
    pub certifications: Option<Vec<String>>,
    pub category_id: Uuid,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: String,
    pub bio: Option<String>,
    pub gender: Gender,
    pub experience_years: i32,
    pub degrees: Vec<String>,
    pub certifications: Option<Vec<String>>,
    pub category_id: Uuid,
    pub is_active: Option<bool>,
}

/// Category payload. The slug is always derived from the name, for both
/// create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChamberRequest {
    pub name: String,
    pub address: String,
    pub contact_number: String,
    pub google_maps_link: Option<String>,
    pub is_primary: Option<bool>,
    pub is_active: Option<bool>,
}

/// Schedule payload. Times arrive as `HH:MM` strings and are parsed before
/// any business rule runs.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScheduleRequest {
    pub chamber_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
    pub max_patients: i32,
    pub is_active: Option<bool>,
}

/// A schedule stays attached to its chamber for life; updates may move it to
/// another day or change its hours and capacity.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateScheduleRequest {
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
    pub max_patients: i32,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorSearchQuery {
    pub category: Option<Uuid>,
    pub search: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("The name field is required")]
    MissingCategoryName,

    #[error("The name has already been taken")]
    CategoryNameTaken,

    #[error("Cannot delete category with associated doctors")]
    CategoryInUse,

    #[error("Chamber not found")]
    ChamberNotFound,

    #[error("Schedule not found")]
    ScheduleNotFound,

    #[error("{field} must be a time in HH:MM format")]
    InvalidTime { field: &'static str },

    #[error("End time must be after start time")]
    EndBeforeStart,

    #[error("A schedule already exists for this time slot")]
    ScheduleConflict,

    #[error("Cannot delete schedule with existing appointments")]
    ScheduleInUse,

    #[error("Max patients must be at least 1")]
    InvalidMaxPatients,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<shared_database::DbError> for DoctorError {
    fn from(err: shared_database::DbError) -> Self {
        DoctorError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for DoctorError {
    fn from(err: serde_json::Error) -> Self {
        DoctorError::Database(err.to_string())
    }
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::CategoryNotFound => AppError::NotFound("Category not found".to_string()),
            DoctorError::MissingCategoryName => {
                AppError::validation("name", "The name field is required")
            }
            DoctorError::CategoryNameTaken => {
                AppError::validation("name", "The name has already been taken")
            }
            DoctorError::CategoryInUse => {
                AppError::validation("category", "Cannot delete category with associated doctors")
            }
            DoctorError::ChamberNotFound => AppError::NotFound("Chamber not found".to_string()),
            DoctorError::ScheduleNotFound => AppError::NotFound("Schedule not found".to_string()),
            DoctorError::InvalidTime { field } => {
                AppError::validation(field, format!("The {} must match the format H:i", field))
            }
            DoctorError::EndBeforeStart => {
                AppError::validation("end_time", "The end time must be after start time")
            }
            DoctorError::ScheduleConflict => {
                AppError::validation("schedule", "A schedule already exists for this time slot")
            }
            DoctorError::ScheduleInUse => {
                AppError::validation("schedule", "Cannot delete schedule with existing appointments")
            }
            DoctorError::InvalidMaxPatients => {
                AppError::validation("max_patients", "The max patients must be at least 1")
            }
            DoctorError::Database(msg) => AppError::Database(msg),
        }
    }
}
