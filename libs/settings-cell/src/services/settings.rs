use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{Setting, SettingError, SettingRequest};

pub struct SettingsService {
    supabase: SupabaseClient,
}

fn upsert_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "Prefer",
        HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
    );
    headers
}

impl SettingsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Settings as a flat key-value map, optionally filtered by group.
    /// Frontends read this once at boot.
    pub async fn list_settings(
        &self,
        group: Option<String>,
    ) -> Result<Map<String, Value>, SettingError> {
        let mut path = "/rest/v1/settings?select=key,value,group".to_string();
        if let Some(group) = group {
            path.push_str(&format!("&group=eq.{}", group));
        }

        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        let mut map = Map::new();
        for row in result {
            let setting: Setting = serde_json::from_value(row)?;
            map.insert(setting.key, json!(setting.value));
        }

        Ok(map)
    }

    pub async fn get_setting(&self, key: &str) -> Result<Setting, SettingError> {
        let path = format!("/rest/v1/settings?key=eq.{}&select=key,value,group", key);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        if result.is_empty() {
            return Err(SettingError::NotFound);
        }

        let setting: Setting = serde_json::from_value(result[0].clone())?;
        Ok(setting)
    }

    /// Insert-or-update keyed on `key`, via PostgREST's merge-duplicates
    /// upsert.
    pub async fn upsert_setting(
        &self,
        request: SettingRequest,
        auth_token: &str,
    ) -> Result<Setting, SettingError> {
        if request.key.trim().is_empty() {
            return Err(SettingError::MissingKey);
        }

        debug!("Upserting setting: {}", request.key);

        let setting_data = json!({
            "key": request.key.trim(),
            "value": request.value,
            "group": request.group
        });

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/settings?on_conflict=key",
                Some(auth_token),
                Some(setting_data),
                Some(upsert_headers()),
            )
            .await?;

        if result.is_empty() {
            return Err(SettingError::Database("Failed to save setting".to_string()));
        }

        let setting: Setting = serde_json::from_value(result[0].clone())?;
        Ok(setting)
    }

    pub async fn batch_update(
        &self,
        requests: Vec<SettingRequest>,
        auth_token: &str,
    ) -> Result<Vec<Setting>, SettingError> {
        let mut updated = Vec::with_capacity(requests.len());
        for request in requests {
            updated.push(self.upsert_setting(request, auth_token).await?);
        }
        Ok(updated)
    }

    pub async fn delete_setting(&self, key: &str, auth_token: &str) -> Result<(), SettingError> {
        debug!("Deleting setting: {}", key);

        let path = format!("/rest/v1/settings?key=eq.{}", key);
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let deleted: Vec<Value> = self
            .supabase
            .request_with_headers(Method::DELETE, &path, Some(auth_token), None, Some(headers))
            .await?;

        if deleted.is_empty() {
            return Err(SettingError::NotFound);
        }

        Ok(())
    }
}
