use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{Chamber, ChamberRequest, DoctorError};

pub struct ChamberService {
    supabase: SupabaseClient,
}

fn representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

impl ChamberService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Chamber>, DoctorError> {
        let path = format!(
            "/rest/v1/chambers?doctor_id=eq.{}&is_active=eq.true&order=is_primary.desc,name.asc",
            doctor_id
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        let chambers = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Chamber>, _>>()?;

        Ok(chambers)
    }

    pub async fn create_chamber(
        &self,
        doctor_id: Uuid,
        request: ChamberRequest,
        auth_token: &str,
    ) -> Result<Chamber, DoctorError> {
        debug!("Creating chamber for doctor: {}", doctor_id);

        // A doctor has at most one primary chamber.
        if request.is_primary.unwrap_or(false) {
            self.clear_primary(doctor_id, None, auth_token).await?;
        }

        let chamber_data = json!({
            "doctor_id": doctor_id,
            "name": request.name,
            "address": request.address,
            "contact_number": request.contact_number,
            "google_maps_link": request.google_maps_link,
            "is_primary": request.is_primary.unwrap_or(false),
            "is_active": request.is_active.unwrap_or(true),
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/chambers",
                Some(auth_token),
                Some(chamber_data),
                Some(representation()),
            )
            .await?;

        if result.is_empty() {
            return Err(DoctorError::Database("Failed to create chamber".to_string()));
        }

        let chamber: Chamber = serde_json::from_value(result[0].clone())?;
        Ok(chamber)
    }

    pub async fn update_chamber(
        &self,
        chamber_id: Uuid,
        request: ChamberRequest,
        auth_token: &str,
    ) -> Result<Chamber, DoctorError> {
        debug!("Updating chamber: {}", chamber_id);

        let path = format!("/rest/v1/chambers?id=eq.{}", chamber_id);
        let existing: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;
        if existing.is_empty() {
            return Err(DoctorError::ChamberNotFound);
        }
        let existing: Chamber = serde_json::from_value(existing[0].clone())?;

        if request.is_primary.unwrap_or(false) {
            self.clear_primary(existing.doctor_id, Some(chamber_id), auth_token)
                .await?;
        }

        let update_data = json!({
            "name": request.name,
            "address": request.address,
            "contact_number": request.contact_number,
            "google_maps_link": request.google_maps_link,
            "is_primary": request.is_primary.unwrap_or(false),
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
            return Err(DoctorError::ChamberNotFound);
        }

        let chamber: Chamber = serde_json::from_value(result[0].clone())?;
        Ok(chamber)
    }

    pub async fn delete_chamber(&self, chamber_id: Uuid, auth_token: &str) -> Result<(), DoctorError> {
        debug!("Deleting chamber: {}", chamber_id);

        let path = format!("/rest/v1/chambers?id=eq.{}", chamber_id);
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
            return Err(DoctorError::ChamberNotFound);
        }

        Ok(())
    }

    /// Demotes the doctor's current primary chamber before another one is
    /// promoted. `exclude` keeps an in-place update from demoting itself.
    async fn clear_primary(
        &self,
        doctor_id: Uuid,
        exclude: Option<Uuid>,
        auth_token: &str,
    ) -> Result<(), DoctorError> {
        let mut path = format!(
            "/rest/v1/chambers?doctor_id=eq.{}&is_primary=eq.true",
            doctor_id
        );
        if let Some(chamber_id) = exclude {
            path.push_str(&format!("&id=neq.{}", chamber_id));
        }

        let update_data = json!({
            "is_primary": false,
            "updated_at": Utc::now().to_rfc3339()
        });

        let _: Vec<Value> = self
            .supabase
            .request(Method::PATCH, &path, Some(auth_token), Some(update_data))
            .await?;

        Ok(())
    }
}
