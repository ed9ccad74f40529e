use chrono::{NaiveTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use doctor_cell::models::DayOfWeek;
use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_utils::time::{parse_hhmm, to_db_time};

use crate::models::{
    Appointment, AppointmentDetail, AppointmentError, AppointmentSearchQuery, AppointmentStatus,
    BookAppointmentRequest,
};
use crate::services::availability::AvailabilityService;

/// Admin appointment list page size.
const DEFAULT_PAGE_SIZE: i32 = 20;

/// PostgREST embed clause pulling the doctor, chamber and schedule rows
/// along with each appointment.
const DETAIL_SELECT: &str = "select=*,doctor:doctors(*),chamber:chambers(*),schedule:schedules(*)";

/// Schedule hours are an inclusive range: booking exactly at the start or
/// end time is allowed.
pub fn within_schedule_hours(time: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    time >= start && time <= end
}

pub struct BookingService {
    supabase: SupabaseClient,
    availability: AvailabilityService,
}

fn representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

fn validate_request(request: &BookAppointmentRequest) -> Result<NaiveTime, AppointmentError> {
    if request.patient_name.trim().is_empty() {
        return Err(AppointmentError::MissingField("patient_name"));
    }
    if request.patient_phone.trim().is_empty() {
        return Err(AppointmentError::MissingField("patient_phone"));
    }

    let email = request.patient_email.trim();
    if email.is_empty() {
        return Err(AppointmentError::MissingField("patient_email"));
    }
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(AppointmentError::InvalidEmail);
    }

    if request.appointment_date < Utc::now().date_naive() {
        return Err(AppointmentError::PastDate);
    }

    parse_hhmm(&request.appointment_time).ok_or(AppointmentError::InvalidTime)
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            availability: AvailabilityService::new(config),
        }
    }

    /// Books an appointment, running the schedule checks in a fixed order:
    /// schedule exists, date matches the schedule's weekday, time is within
    /// its hours, a slot is free, and the exact slot is not already taken.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<AppointmentDetail, AppointmentError> {
        let time = validate_request(&request)?;

        let schedule = self.availability.get_schedule(request.schedule_id).await?;

        if DayOfWeek::from_date(request.appointment_date) != schedule.day_of_week {
            return Err(AppointmentError::DateScheduleMismatch);
        }

        if !within_schedule_hours(time, schedule.start_time, schedule.end_time) {
            return Err(AppointmentError::TimeOutsideSchedule);
        }

        if self
            .availability
            .available_slots(&schedule, request.appointment_date)
            .await?
            <= 0
        {
            return Err(AppointmentError::NoSlotsAvailable);
        }

        let dup_path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_date=eq.{}&appointment_time=eq.{}&status=neq.cancelled&select=id&limit=1",
            request.doctor_id,
            request.appointment_date,
            to_db_time(time)
        );
        let duplicates: Vec<Value> = self
            .supabase
            .request(Method::GET, &dup_path, None, None)
            .await?;
        if !duplicates.is_empty() {
            return Err(AppointmentError::SlotAlreadyBooked);
        }

        debug!(
            "Booking appointment for {} on {} at {}",
            request.patient_name, request.appointment_date, request.appointment_time
        );

        let appointment_data = json!({
            "doctor_id": request.doctor_id,
            "chamber_id": request.chamber_id,
            "schedule_id": request.schedule_id,
            "patient_name": request.patient_name.trim(),
            "patient_email": request.patient_email.trim(),
            "patient_phone": request.patient_phone.trim(),
            "appointment_date": request.appointment_date,
            "appointment_time": to_db_time(time),
            "symptoms": request.symptoms,
            "status": AppointmentStatus::Pending,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        // A concurrent booking can slip between the duplicate check and the
        // insert; the unique index turns that race into SlotAlreadyBooked.
        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                None,
                Some(appointment_data),
                Some(representation()),
            )
            .await?;

        if result.is_empty() {
            return Err(AppointmentError::Database(
                "Failed to book appointment".to_string(),
            ));
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())?;
        self.get_appointment(appointment.id).await
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<AppointmentDetail, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&{}",
            appointment_id, DETAIL_SELECT
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        let detail: AppointmentDetail = serde_json::from_value(result[0].clone())?;
        Ok(detail)
    }

    /// Admin listing ordered by date then time.
    pub async fn search_appointments(
        &self,
        query: AppointmentSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<AppointmentDetail>, AppointmentError> {
        let mut query_parts = vec![DETAIL_SELECT.to_string()];

        if let Some(status) = query.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if let Some(date) = query.date {
            query_parts.push(format!("appointment_date=eq.{}", date));
        }

        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let offset = query.offset.unwrap_or(0);
        query_parts.push(format!(
            "order=appointment_date.asc,appointment_time.asc&limit={}&offset={}",
            limit, offset
        ));

        let path = format!("/rest/v1/appointments?{}", query_parts.join("&"));
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let appointments = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<AppointmentDetail>, _>>()?;

        Ok(appointments)
    }
}
