use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_utils::slug::slugify;

use crate::models::{
    Chamber, CreateDoctorRequest, Doctor, DoctorDetail, DoctorError, DoctorSearchQuery, Schedule,
    UpdateDoctorRequest,
};

/// Public doctor listings page size.
const DEFAULT_PAGE_SIZE: i32 = 12;

pub struct DoctorService {
    supabase: SupabaseClient,
}

fn representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Active doctors filtered by category and free-text search, ordered by
    /// name. Search matches name and bio.
    pub async fn search_doctors(&self, query: DoctorSearchQuery) -> Result<Vec<Doctor>, DoctorError> {
        let mut query_parts = vec!["is_active=eq.true".to_string()];

        if let Some(category) = query.category {
            query_parts.push(format!("category_id=eq.{}", category));
        }
        if let Some(search) = query.search.filter(|s| !s.trim().is_empty()) {
            let term = urlencoding::encode(search.trim()).into_owned();
            query_parts.push(format!("or=(name.ilike.*{term}*,bio.ilike.*{term}*)"));
        }

        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let offset = query.offset.unwrap_or(0);

        let path = format!(
            "/rest/v1/doctors?{}&order=name.asc&limit={}&offset={}",
            query_parts.join("&"),
            limit,
            offset
        );

        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        let doctors = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Doctor>, _>>()?;

        Ok(doctors)
    }

    /// Doctor profile with its active chambers and schedules.
    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<DoctorDetail, DoctorError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        if result.is_empty() {
            return Err(DoctorError::NotFound);
        }
        let doctor: Doctor = serde_json::from_value(result[0].clone())?;

        let chambers_path = format!(
            "/rest/v1/chambers?doctor_id=eq.{}&is_active=eq.true&order=is_primary.desc",
            doctor_id
        );
        let chambers: Vec<Value> = self
            .supabase
            .request(Method::GET, &chambers_path, None, None)
            .await?;
        let chambers = chambers
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Chamber>, _>>()?;

        let schedules_path = format!(
            "/rest/v1/schedules?doctor_id=eq.{}&is_active=eq.true&order=start_time.asc",
            doctor_id
        );
        let schedules: Vec<Value> = self
            .supabase
            .request(Method::GET, &schedules_path, None, None)
            .await?;
        let schedules = schedules
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Schedule>, _>>()?;

        Ok(DoctorDetail {
            doctor,
            chambers,
            schedules,
        })
    }

    /// Finds a doctor by its URL slug, used by the public profile pages.
    pub async fn get_doctor_by_slug(&self, slug: &str) -> Result<DoctorDetail, DoctorError> {
        let path = format!("/rest/v1/doctors?slug=eq.{}", slug);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        if result.is_empty() {
            return Err(DoctorError::NotFound);
        }
        let doctor: Doctor = serde_json::from_value(result[0].clone())?;
        self.get_doctor(doctor.id).await
    }

    pub async fn create_doctor(
        &self,
        request: CreateDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        debug!("Creating doctor profile for: {}", request.name);

        let doctor_data = json!({
            "name": request.name,
            "slug": slugify(&request.name),
            "bio": request.bio,
            "gender": request.gender,
            "experience_years": request.experience_years,
            "degrees": request.degrees,
            "certifications": request.certifications,
            "category_id": request.category_id,
            "is_active": request.is_active.unwrap_or(true),
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctors",
                Some(auth_token),
                Some(doctor_data),
                Some(representation()),
            )
            .await?;

        if result.is_empty() {
            return Err(DoctorError::Database(
                "Failed to create doctor profile".to_string(),
            ));
        }

        let doctor: Doctor = serde_json::from_value(result[0].clone())?;
        debug!("Doctor profile created with id: {}", doctor.id);

        Ok(doctor)
    }

    /// Full-record update. The slug is regenerated from the submitted name so
    /// profile URLs track renames.
    pub async fn update_doctor(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor profile: {}", doctor_id);

        let update_data = json!({
            "name": request.name,
            "slug": slugify(&request.name),
            "bio": request.bio,
            "gender": request.gender,
            "experience_years": request.experience_years,
            "degrees": request.degrees,
            "certifications": request.certifications,
            "category_id": request.category_id,
            "is_active": request.is_active.unwrap_or(true),
            "updated_at": Utc::now().to_rfc3339()
        });

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
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
            return Err(DoctorError::NotFound);
        }

        let doctor: Doctor = serde_json::from_value(result[0].clone())?;
        Ok(doctor)
    }

    pub async fn delete_doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<(), DoctorError> {
        debug!("Deleting doctor profile: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
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
            return Err(DoctorError::NotFound);
        }

        Ok(())
    }
}
