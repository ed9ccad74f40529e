use assert_matches::assert_matches;
use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use wiremock::matchers::{headers, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use settings_cell::handlers::*;
use settings_cell::models::*;
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

#[tokio::test]
async fn list_settings_returns_key_value_map() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "key": "clinic_name", "value": "City Clinic", "group": "general" },
            { "key": "slot_duration_minutes", "value": 30, "group": "booking" },
            { "key": "online_booking_enabled", "value": true, "group": "booking" }
        ])))
        .mount(&mock_server)
        .await;

    let result = list_settings(
        State(config.to_arc()),
        Query(SettingsQuery { group: None }),
    )
    .await;

    let response = result.expect("list_settings should succeed").0;
    assert_eq!(response["clinic_name"], "City Clinic");
    assert_eq!(response["slot_duration_minutes"], 30);
    assert_eq!(response["online_booking_enabled"], true);
}

#[tokio::test]
async fn list_settings_forwards_group_filter() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/settings"))
        .and(query_param("group", "eq.booking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "key": "slot_duration_minutes", "value": 30, "group": "booking" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = list_settings(
        State(config.to_arc()),
        Query(SettingsQuery {
            group: Some("booking".to_string()),
        }),
    )
    .await;

    let response = result.expect("list_settings should succeed").0;
    assert_eq!(response["slot_duration_minutes"], 30);
}

#[tokio::test]
async fn get_setting_unknown_key_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = get_setting(State(config.to_arc()), Path("missing".to_string())).await;

    assert_matches!(result.unwrap_err(), AppError::NotFound(_));
}

#[tokio::test]
async fn upsert_setting_uses_merge_duplicates() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());
    let admin = TestUser::admin("admin@example.com");
    let token = JwtTestUtils::create_test_token(&admin, &config.jwt_secret, Some(24));

    Mock::given(method("POST"))
        .and(path("/rest/v1/settings"))
        .and(query_param("on_conflict", "key"))
        .and(headers(
            "Prefer",
            vec!["resolution=merge-duplicates", "return=representation"],
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "key": "clinic_name", "value": "City Clinic", "group": "general" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = upsert_setting(
        State(config.to_arc()),
        auth_header(&token),
        Extension(admin.to_user()),
        Json(SettingRequest {
            key: "clinic_name".to_string(),
            value: SettingValue::Text("City Clinic".to_string()),
            group: Some("general".to_string()),
        }),
    )
    .await;

    let (status, response) = result.expect("upsert should succeed");
    assert_eq!(status, axum::http::StatusCode::CREATED);
    assert_eq!(response.0["setting"]["key"], "clinic_name");
}

#[tokio::test]
async fn upsert_setting_rejects_blank_key() {
    let config = TestConfig::default();
    let admin = TestUser::admin("admin@example.com");
    let token = JwtTestUtils::create_test_token(&admin, &config.jwt_secret, Some(24));

    let result = upsert_setting(
        State(config.to_arc()),
        auth_header(&token),
        Extension(admin.to_user()),
        Json(SettingRequest {
            key: "  ".to_string(),
            value: SettingValue::Bool(true),
            group: None,
        }),
    )
    .await;

    assert_matches!(
        result.unwrap_err(),
        AppError::Validation { field: "key", .. }
    );
}

#[tokio::test]
async fn upsert_setting_rejects_non_admin() {
    let config = TestConfig::default();
    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, Some(24));

    let result = upsert_setting(
        State(config.to_arc()),
        auth_header(&token),
        Extension(patient.to_user()),
        Json(SettingRequest {
            key: "clinic_name".to_string(),
            value: SettingValue::Text("Mine Now".to_string()),
            group: None,
        }),
    )
    .await;

    assert_matches!(result.unwrap_err(), AppError::Auth(_));
}

#[tokio::test]
async fn batch_update_saves_each_setting() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());
    let admin = TestUser::admin("admin@example.com");
    let token = JwtTestUtils::create_test_token(&admin, &config.jwt_secret, Some(24));

    Mock::given(method("POST"))
        .and(path("/rest/v1/settings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "key": "k", "value": 1, "group": null }
        ])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let result = batch_update_settings(
        State(config.to_arc()),
        auth_header(&token),
        Extension(admin.to_user()),
        Json(BatchUpdateRequest {
            settings: vec![
                SettingRequest {
                    key: "a".to_string(),
                    value: SettingValue::Integer(1),
                    group: None,
                },
                SettingRequest {
                    key: "b".to_string(),
                    value: SettingValue::Integer(2),
                    group: None,
                },
            ],
        }),
    )
    .await;

    let response = result.expect("batch update should succeed").0;
    assert_eq!(response["settings"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn delete_setting_unknown_key_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());
    let admin = TestUser::admin("admin@example.com");
    let token = JwtTestUtils::create_test_token(&admin, &config.jwt_secret, Some(24));

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = delete_setting(
        State(config.to_arc()),
        auth_header(&token),
        Path("missing".to_string()),
        Extension(admin.to_user()),
    )
    .await;

    assert_matches!(result.unwrap_err(), AppError::NotFound(_));
}
