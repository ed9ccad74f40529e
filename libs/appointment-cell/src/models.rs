use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use doctor_cell::models::{Chamber, Doctor, Schedule};
use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub chamber_id: Uuid,
    pub schedule_id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub symptoms: Option<String>,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Appointment with its doctor, chamber and schedule embedded, as returned
/// by PostgREST resource embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor: Option<Doctor>,
    pub chamber: Option<Chamber>,
    pub schedule: Option<Schedule>,
}

/// Booking payload submitted by the public site. The time arrives as an
/// `HH:MM` string and is validated before any schedule rule runs.
#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub chamber_id: Uuid,
    pub schedule_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub symptoms: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelAppointmentRequest {
    pub cancellation_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentSearchQuery {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// Booking and lifecycle rejections, in the order the booking validator
/// checks them.
#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("The selected schedule does not exist")]
    ScheduleNotFound,

    #[error("The selected date does not match the doctor's schedule")]
    DateScheduleMismatch,

    #[error("The selected time is outside of doctor's schedule hours")]
    TimeOutsideSchedule,

    #[error("No available slots for the selected date")]
    NoSlotsAvailable,

    #[error("This time slot is already booked")]
    SlotAlreadyBooked,

    #[error("The appointment date must be today or a future date")]
    PastDate,

    #[error("The appointment time must match the format H:i")]
    InvalidTime,

    #[error("The {0} field is required")]
    MissingField(&'static str),

    #[error("The patient email must be a valid email address")]
    InvalidEmail,

    #[error("Appointment not found")]
    NotFound,

    #[error("Only pending appointments can be confirmed")]
    NotPending,

    #[error("Appointment is already cancelled")]
    AlreadyCancelled,

    #[error("Confirmed appointments cannot be cancelled")]
    ConfirmedIsFinal,

    #[error("The cancellation reason field is required")]
    MissingCancellationReason,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<shared_database::DbError> for AppointmentError {
    fn from(err: shared_database::DbError) -> Self {
        match err {
            // The unique index on (doctor_id, appointment_date,
            // appointment_time) catches bookings that race past the
            // duplicate check.
            shared_database::DbError::UniqueViolation(_) => AppointmentError::SlotAlreadyBooked,
            other => AppointmentError::Database(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppointmentError {
    fn from(err: serde_json::Error) -> Self {
        AppointmentError::Database(err.to_string())
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();
        match err {
            AppointmentError::ScheduleNotFound => AppError::validation("schedule_id", message),
            AppointmentError::DateScheduleMismatch | AppointmentError::PastDate => {
                AppError::validation("appointment_date", message)
            }
            AppointmentError::TimeOutsideSchedule
            | AppointmentError::SlotAlreadyBooked
            | AppointmentError::InvalidTime => AppError::validation("appointment_time", message),
            AppointmentError::NoSlotsAvailable => AppError::validation("schedule", message),
            AppointmentError::MissingField(field) => AppError::validation(field, message),
            AppointmentError::InvalidEmail => AppError::validation("patient_email", message),
            AppointmentError::NotFound => AppError::NotFound(message),
            AppointmentError::NotPending
            | AppointmentError::AlreadyCancelled
            | AppointmentError::ConfirmedIsFinal => AppError::validation("appointment", message),
            AppointmentError::MissingCancellationReason => {
                AppError::validation("cancellation_reason", message)
            }
            AppointmentError::Database(msg) => AppError::Database(msg),
        }
    }
}
