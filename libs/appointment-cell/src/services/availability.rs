use chrono::NaiveDate;
use reqwest::Method;
use serde_json::Value;
use uuid::Uuid;

use doctor_cell::models::Schedule;
use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::AppointmentError;

/// Slots left on a schedule for a given day. Cancelled appointments free
/// their slot, so they never count against capacity.
pub fn remaining_slots(max_patients: i32, booked: i32) -> i32 {
    (max_patients - booked).max(0)
}

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_schedule(&self, schedule_id: Uuid) -> Result<Schedule, AppointmentError> {
        let path = format!("/rest/v1/schedules?id=eq.{}", schedule_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        if result.is_empty() {
            return Err(AppointmentError::ScheduleNotFound);
        }

        let schedule: Schedule = serde_json::from_value(result[0].clone())?;
        Ok(schedule)
    }

    pub async fn available_slots(
        &self,
        schedule: &Schedule,
        date: NaiveDate,
    ) -> Result<i32, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?schedule_id=eq.{}&appointment_date=eq.{}&status=neq.cancelled&select=id",
            schedule.id, date
        );
        let booked: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        Ok(remaining_slots(schedule.max_patients, booked.len() as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_shrink_with_bookings() {
        assert_eq!(remaining_slots(20, 0), 20);
        assert_eq!(remaining_slots(20, 19), 1);
        assert_eq!(remaining_slots(20, 20), 0);
    }

    #[test]
    fn overbooked_days_report_zero_not_negative() {
        assert_eq!(remaining_slots(5, 9), 0);
    }
}
