use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{Appointment, AppointmentError, AppointmentStatus};

/// Confirming is only valid from `pending`. Both `confirmed` and
/// `cancelled` are terminal states.
pub fn confirm_transition(status: AppointmentStatus) -> Result<AppointmentStatus, AppointmentError> {
    match status {
        AppointmentStatus::Pending => Ok(AppointmentStatus::Confirmed),
        _ => Err(AppointmentError::NotPending),
    }
}

pub fn cancel_transition(status: AppointmentStatus) -> Result<AppointmentStatus, AppointmentError> {
    match status {
        AppointmentStatus::Pending => Ok(AppointmentStatus::Cancelled),
        AppointmentStatus::Cancelled => Err(AppointmentError::AlreadyCancelled),
        AppointmentStatus::Confirmed => Err(AppointmentError::ConfirmedIsFinal),
    }
}

pub struct LifecycleService {
    supabase: SupabaseClient,
}

fn representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

impl LifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn confirm_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Confirming appointment: {}", appointment_id);

        let appointment = self.fetch_appointment(appointment_id).await?;
        let next = confirm_transition(appointment.status)?;

        self.write_status(appointment_id, next, None, auth_token).await
    }

    /// The reason is recorded verbatim alongside the status change.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        reason: Option<String>,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let appointment = self.fetch_appointment(appointment_id).await?;
        let next = cancel_transition(appointment.status)?;

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .ok_or(AppointmentError::MissingCancellationReason)?;

        self.write_status(appointment_id, next, Some(reason), auth_token)
            .await
    }

    async fn fetch_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())?;
        Ok(appointment)
    }

    async fn write_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
        cancellation_reason: Option<String>,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let mut update_data = serde_json::Map::new();
        update_data.insert("status".to_string(), json!(status));
        if let Some(reason) = cancellation_reason {
            update_data.insert("cancellation_reason".to_string(), json!(reason));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(update_data)),
                Some(representation()),
            )
            .await?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())?;
        Ok(appointment)
    }
}
