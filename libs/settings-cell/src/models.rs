use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

/// Typed setting value. Untagged, so `true`, `42`, `"clinic name"` and JSON
/// documents all round-trip without a wrapper object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Document(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: SettingValue,
    pub group: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettingRequest {
    pub key: String,
    pub value: SettingValue,
    pub group: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchUpdateRequest {
    pub settings: Vec<SettingRequest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsQuery {
    pub group: Option<String>,
}

#[derive(Debug, Error)]
pub enum SettingError {
    #[error("Setting not found")]
    NotFound,

    #[error("The key field is required")]
    MissingKey,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<shared_database::DbError> for SettingError {
    fn from(err: shared_database::DbError) -> Self {
        SettingError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for SettingError {
    fn from(err: serde_json::Error) -> Self {
        SettingError::Database(err.to_string())
    }
}

impl From<SettingError> for AppError {
    fn from(err: SettingError) -> Self {
        match err {
            SettingError::NotFound => AppError::NotFound("Setting not found".to_string()),
            SettingError::MissingKey => {
                AppError::validation("key", "The key field is required")
            }
            SettingError::Database(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_deserialize_to_their_natural_type() {
        assert_eq!(
            serde_json::from_str::<SettingValue>("true").unwrap(),
            SettingValue::Bool(true)
        );
        assert_eq!(
            serde_json::from_str::<SettingValue>("30").unwrap(),
            SettingValue::Integer(30)
        );
        assert_eq!(
            serde_json::from_str::<SettingValue>("2.5").unwrap(),
            SettingValue::Float(2.5)
        );
        assert_eq!(
            serde_json::from_str::<SettingValue>("\"City Clinic\"").unwrap(),
            SettingValue::Text("City Clinic".to_string())
        );
    }

    #[test]
    fn structured_values_fall_through_to_document() {
        let value: SettingValue =
            serde_json::from_str(r#"{"open": "09:00", "close": "17:00"}"#).unwrap();
        assert!(matches!(value, SettingValue::Document(_)));
    }

    #[test]
    fn values_serialize_without_a_wrapper() {
        assert_eq!(
            serde_json::to_string(&SettingValue::Integer(30)).unwrap(),
            "30"
        );
        assert_eq!(
            serde_json::to_string(&SettingValue::Text("hello".to_string())).unwrap(),
            "\"hello\""
        );
    }
}
