use chrono::{NaiveTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_utils::time::{parse_hhmm, to_db_time};

use crate::models::{
    CreateScheduleRequest, DayOfWeek, DoctorError, Schedule, UpdateScheduleRequest,
};

pub struct ScheduleService {
    supabase: SupabaseClient,
}

fn representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

/// Two time ranges clash when each one starts before the other ends.
/// Back-to-back ranges (one ending exactly when the other starts) do not.
pub fn ranges_overlap(
    start: NaiveTime,
    end: NaiveTime,
    other_start: NaiveTime,
    other_end: NaiveTime,
) -> bool {
    start < other_end && end > other_start
}

fn parse_times(start: &str, end: &str) -> Result<(NaiveTime, NaiveTime), DoctorError> {
    let start_time = parse_hhmm(start).ok_or(DoctorError::InvalidTime {
        field: "start_time",
    })?;
    let end_time = parse_hhmm(end).ok_or(DoctorError::InvalidTime { field: "end_time" })?;

    if end_time <= start_time {
        return Err(DoctorError::EndBeforeStart);
    }

    Ok((start_time, end_time))
}

impl ScheduleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Schedule>, DoctorError> {
        let path = format!(
            "/rest/v1/schedules?doctor_id=eq.{}&is_active=eq.true&order=start_time.asc",
            doctor_id
        );
        self.fetch_schedules(&path).await
    }

    pub async fn list_for_chamber(&self, chamber_id: Uuid) -> Result<Vec<Schedule>, DoctorError> {
        let path = format!(
            "/rest/v1/schedules?chamber_id=eq.{}&is_active=eq.true&order=day_of_week.asc,start_time.asc",
            chamber_id
        );
        self.fetch_schedules(&path).await
    }

    pub async fn create_schedule(
        &self,
        doctor_id: Uuid,
        request: CreateScheduleRequest,
        auth_token: &str,
    ) -> Result<Schedule, DoctorError> {
        debug!("Creating schedule for doctor: {}", doctor_id);

        let (start_time, end_time) = parse_times(&request.start_time, &request.end_time)?;
        if request.max_patients < 1 {
            return Err(DoctorError::InvalidMaxPatients);
        }

        self.check_conflict(
            doctor_id,
            request.chamber_id,
            request.day_of_week,
            start_time,
            end_time,
            None,
        )
        .await?;

        let schedule_data = json!({
            "doctor_id": doctor_id,
            "chamber_id": request.chamber_id,
            "day_of_week": request.day_of_week,
            "start_time": to_db_time(start_time),
            "end_time": to_db_time(end_time),
            "max_patients": request.max_patients,
            "is_active": request.is_active.unwrap_or(true),
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/schedules",
                Some(auth_token),
                Some(schedule_data),
                Some(representation()),
            )
            .await?;

        if result.is_empty() {
            return Err(DoctorError::Database("Failed to create schedule".to_string()));
        }

        let schedule: Schedule = serde_json::from_value(result[0].clone())?;
        Ok(schedule)
    }

    pub async fn update_schedule(
        &self,
        schedule_id: Uuid,
        request: UpdateScheduleRequest,
        auth_token: &str,
    ) -> Result<Schedule, DoctorError> {
        debug!("Updating schedule: {}", schedule_id);

        let (start_time, end_time) = parse_times(&request.start_time, &request.end_time)?;
        if request.max_patients < 1 {
            return Err(DoctorError::InvalidMaxPatients);
        }

        let path = format!("/rest/v1/schedules?id=eq.{}", schedule_id);
        let existing: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;
        if existing.is_empty() {
            return Err(DoctorError::ScheduleNotFound);
        }
        let existing: Schedule = serde_json::from_value(existing[0].clone())?;

        self.check_conflict(
            existing.doctor_id,
            existing.chamber_id,
            request.day_of_week,
            start_time,
            end_time,
            Some(schedule_id),
        )
        .await?;

        let update_data = json!({
            "day_of_week": request.day_of_week,
            "start_time": to_db_time(start_time),
            "end_time": to_db_time(end_time),
            "max_patients": request.max_patients,
            "is_active": request.is_active.unwrap_or(true),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(update_data),
                Some(representation()),
            )
            .await?;

        if result.is_empty() {
            return Err(DoctorError::ScheduleNotFound);
        }

        let schedule: Schedule = serde_json::from_value(result[0].clone())?;
        Ok(schedule)
    }

    /// Deletes a schedule unless appointments were ever booked against it.
    pub async fn delete_schedule(
        &self,
        schedule_id: Uuid,
        auth_token: &str,
    ) -> Result<(), DoctorError> {
        debug!("Deleting schedule: {}", schedule_id);

        let appointments_path = format!(
            "/rest/v1/appointments?schedule_id=eq.{}&limit=1",
            schedule_id
        );
        let appointments: Vec<Value> = self
            .supabase
            .request(Method::GET, &appointments_path, Some(auth_token), None)
            .await?;

        if !appointments.is_empty() {
            return Err(DoctorError::ScheduleInUse);
        }

        let path = format!("/rest/v1/schedules?id=eq.{}", schedule_id);
        let deleted: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                Some(auth_token),
                None,
                Some(representation()),
            )
            .await?;

        if deleted.is_empty() {
            return Err(DoctorError::ScheduleNotFound);
        }

        Ok(())
    }

    async fn fetch_schedules(&self, path: &str) -> Result<Vec<Schedule>, DoctorError> {
        let result: Vec<Value> = self.supabase.request(Method::GET, path, None, None).await?;

        let schedules = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Schedule>, _>>()?;

        Ok(schedules)
    }

    /// Rejects a schedule whose hours overlap another schedule for the same
    /// doctor, chamber and day. `exclude` skips the schedule being updated.
    async fn check_conflict(
        &self,
        doctor_id: Uuid,
        chamber_id: Uuid,
        day_of_week: DayOfWeek,
        start_time: NaiveTime,
        end_time: NaiveTime,
        exclude: Option<Uuid>,
    ) -> Result<(), DoctorError> {
        let mut path = format!(
            "/rest/v1/schedules?doctor_id=eq.{}&chamber_id=eq.{}&day_of_week=eq.{}",
            doctor_id, chamber_id, day_of_week
        );
        if let Some(schedule_id) = exclude {
            path.push_str(&format!("&id=neq.{}", schedule_id));
        }

        let existing = self.fetch_schedules(&path).await?;

        for schedule in existing {
            if ranges_overlap(start_time, end_time, schedule.start_time, schedule.end_time) {
                return Err(DoctorError::ScheduleConflict);
            }
        }

        Ok(())
    }
}
