use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_utils::slug::slugify;

use crate::models::{Category, CategoryDetail, CategoryRequest, Doctor, DoctorError};

pub struct CategoryService {
    supabase: SupabaseClient,
}

fn representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

impl CategoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Active categories ordered by name, for the public directory.
    pub async fn list_categories(&self) -> Result<Vec<Category>, DoctorError> {
        let path = "/rest/v1/categories?is_active=eq.true&order=name.asc";
        let result: Vec<Value> = self.supabase.request(Method::GET, path, None, None).await?;

        let categories = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok(categories)
    }

    /// Category with the doctors filed under it.
    pub async fn get_category(&self, category_id: Uuid) -> Result<CategoryDetail, DoctorError> {
        let path = format!("/rest/v1/categories?id=eq.{}", category_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        if result.is_empty() {
            return Err(DoctorError::CategoryNotFound);
        }
        let category: Category = serde_json::from_value(result[0].clone())?;

        let doctors_path = format!(
            "/rest/v1/doctors?category_id=eq.{}&is_active=eq.true&order=name.asc",
            category_id
        );
        let doctors: Vec<Value> = self
            .supabase
            .request(Method::GET, &doctors_path, None, None)
            .await?;
        let doctors = doctors
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Doctor>, _>>()?;

        Ok(CategoryDetail { category, doctors })
    }

    /// Finds a category by its URL slug, used by the public directory pages.
    pub async fn get_category_by_slug(&self, slug: &str) -> Result<CategoryDetail, DoctorError> {
        let path = format!("/rest/v1/categories?slug=eq.{}", slug);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        if result.is_empty() {
            return Err(DoctorError::CategoryNotFound);
        }
        let category: Category = serde_json::from_value(result[0].clone())?;
        self.get_category(category.id).await
    }

    pub async fn create_category(
        &self,
        request: CategoryRequest,
        auth_token: &str,
    ) -> Result<Category, DoctorError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(DoctorError::MissingCategoryName);
        }
        self.check_name_taken(name, None).await?;

        debug!("Creating category: {}", name);

        let category_data = json!({
            "name": name,
            "slug": slugify(name),
            "description": request.description,
            "is_active": request.is_active.unwrap_or(true),
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/categories",
                Some(auth_token),
                Some(category_data),
                Some(representation()),
            )
            .await?;

        if result.is_empty() {
            return Err(DoctorError::Database(
                "Failed to create category".to_string(),
            ));
        }

        let category: Category = serde_json::from_value(result[0].clone())?;
        debug!("Category created with id: {}", category.id);

        Ok(category)
    }

    /// Full-record update. The slug is regenerated from the submitted name.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        request: CategoryRequest,
        auth_token: &str,
    ) -> Result<Category, DoctorError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(DoctorError::MissingCategoryName);
        }
        self.check_name_taken(name, Some(category_id)).await?;

        debug!("Updating category: {}", category_id);

        let update_data = json!({
            "name": name,
            "slug": slugify(name),
            "description": request.description,
            "is_active": request.is_active.unwrap_or(true),
            "updated_at": Utc::now().to_rfc3339()
        });

        let path = format!("/rest/v1/categories?id=eq.{}", category_id);
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
            return Err(DoctorError::CategoryNotFound);
        }

        let category: Category = serde_json::from_value(result[0].clone())?;
        Ok(category)
    }

    /// Refuses to delete while any doctor still references the category.
    pub async fn delete_category(
        &self,
        category_id: Uuid,
        auth_token: &str,
    ) -> Result<(), DoctorError> {
        let doctors_path = format!(
            "/rest/v1/doctors?category_id=eq.{}&select=id&limit=1",
            category_id
        );
        let doctors: Vec<Value> = self
            .supabase
            .request(Method::GET, &doctors_path, Some(auth_token), None)
            .await?;
        if !doctors.is_empty() {
            return Err(DoctorError::CategoryInUse);
        }

        debug!("Deleting category: {}", category_id);

        let path = format!("/rest/v1/categories?id=eq.{}", category_id);
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
            return Err(DoctorError::CategoryNotFound);
        }

        Ok(())
    }

    /// Category names are unique; updates exclude their own row.
    async fn check_name_taken(
        &self,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), DoctorError> {
        let mut path = format!(
            "/rest/v1/categories?name=eq.{}&select=id&limit=1",
            urlencoding::encode(name)
        );
        if let Some(id) = exclude {
            path.push_str(&format!("&id=neq.{}", id));
        }

        let existing: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;
        if existing.is_empty() {
            Ok(())
        } else {
            Err(DoctorError::CategoryNameTaken)
        }
    }
}
