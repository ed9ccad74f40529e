use assert_matches::assert_matches;
use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::handlers::*;
use appointment_cell::models::*;
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

/// First date at least a week out that falls on the given weekday, so date
/// validation never trips over "today".
fn upcoming(day: Weekday) -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(7);
    while date.weekday() != day {
        date += Duration::days(1);
    }
    date
}

fn schedule_row(id: Uuid, doctor_id: Uuid, chamber_id: Uuid, max_patients: i32) -> serde_json::Value {
    json!({
        "id": id,
        "doctor_id": doctor_id,
        "chamber_id": chamber_id,
        "day_of_week": "monday",
        "start_time": "09:00:00",
        "end_time": "17:00:00",
        "max_patients": max_patients,
        "is_active": true,
        "created_at": Utc::now().to_rfc3339(),
        "updated_at": Utc::now().to_rfc3339()
    })
}

fn appointment_row(
    id: Uuid,
    doctor_id: Uuid,
    chamber_id: Uuid,
    schedule_id: Uuid,
    date: NaiveDate,
    status: &str,
) -> serde_json::Value {
    json!({
        "id": id,
        "doctor_id": doctor_id,
        "chamber_id": chamber_id,
        "schedule_id": schedule_id,
        "patient_name": "Jamal Uddin",
        "patient_email": "jamal@example.com",
        "patient_phone": "+8801800000000",
        "appointment_date": date,
        "appointment_time": "10:30:00",
        "symptoms": null,
        "status": status,
        "cancellation_reason": null,
        "created_at": Utc::now().to_rfc3339(),
        "updated_at": Utc::now().to_rfc3339()
    })
}

fn detail_row(
    id: Uuid,
    doctor_id: Uuid,
    chamber_id: Uuid,
    schedule_id: Uuid,
    date: NaiveDate,
    status: &str,
) -> serde_json::Value {
    let mut row = appointment_row(id, doctor_id, chamber_id, schedule_id, date, status);
    row["doctor"] = json!(null);
    row["chamber"] = json!(null);
    row["schedule"] = schedule_row(schedule_id, doctor_id, chamber_id, 20);
    row
}

fn booking_request(
    doctor_id: Uuid,
    chamber_id: Uuid,
    schedule_id: Uuid,
    date: NaiveDate,
    time: &str,
) -> BookAppointmentRequest {
    BookAppointmentRequest {
        doctor_id,
        chamber_id,
        schedule_id,
        appointment_date: date,
        appointment_time: time.to_string(),
        patient_name: "Jamal Uddin".to_string(),
        patient_email: "jamal@example.com".to_string(),
        patient_phone: "+8801800000000".to_string(),
        symptoms: Some("Chest pain".to_string()),
    }
}

async fn mount_schedule(mock_server: &MockServer, row: serde_json::Value, schedule_id: Uuid) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/schedules"))
        .and(query_param("id", format!("eq.{}", schedule_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(mock_server)
        .await;
}

async fn mount_slot_count(mock_server: &MockServer, schedule_id: Uuid, booked: usize) {
    let rows: Vec<serde_json::Value> = (0..booked).map(|_| json!({ "id": Uuid::new_v4() })).collect();
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("schedule_id", format!("eq.{}", schedule_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(rows)))
        .mount(mock_server)
        .await;
}

async fn mount_duplicate_check(mock_server: &MockServer, doctor_id: Uuid, taken: bool) {
    let body = if taken {
        json!([{ "id": Uuid::new_v4() }])
    } else {
        json!([])
    };
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn booking_succeeds_on_open_slot() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());

    let doctor_id = Uuid::new_v4();
    let chamber_id = Uuid::new_v4();
    let schedule_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();
    let date = upcoming(Weekday::Mon);

    mount_schedule(&mock_server, schedule_row(schedule_id, doctor_id, chamber_id, 20), schedule_id).await;
    mount_slot_count(&mock_server, schedule_id, 3).await;
    mount_duplicate_check(&mock_server, doctor_id, false).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            appointment_row(appointment_id, doctor_id, chamber_id, schedule_id, date, "pending")
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            detail_row(appointment_id, doctor_id, chamber_id, schedule_id, date, "pending")
        ])))
        .mount(&mock_server)
        .await;

    let result = book_appointment(
        State(config.to_arc()),
        Json(booking_request(doctor_id, chamber_id, schedule_id, date, "10:30")),
    )
    .await;

    let (status, response) = result.expect("booking should succeed");
    assert_eq!(status, axum::http::StatusCode::CREATED);
    assert_eq!(response.0["message"], "Appointment booked successfully");
    assert_eq!(response.0["appointment"]["status"], "pending");
}

#[tokio::test]
async fn booking_rejects_unknown_schedule() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());
    let schedule_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = book_appointment(
        State(config.to_arc()),
        Json(booking_request(
            Uuid::new_v4(),
            Uuid::new_v4(),
            schedule_id,
            upcoming(Weekday::Mon),
            "10:30",
        )),
    )
    .await;

    assert_matches!(
        result.unwrap_err(),
        AppError::Validation { field: "schedule_id", .. }
    );
}

#[tokio::test]
async fn booking_rejects_wrong_weekday() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());

    let doctor_id = Uuid::new_v4();
    let chamber_id = Uuid::new_v4();
    let schedule_id = Uuid::new_v4();

    mount_schedule(&mock_server, schedule_row(schedule_id, doctor_id, chamber_id, 20), schedule_id).await;

    // Schedule sits on Monday, booking lands on Tuesday.
    let result = book_appointment(
        State(config.to_arc()),
        Json(booking_request(
            doctor_id,
            chamber_id,
            schedule_id,
            upcoming(Weekday::Tue),
            "10:30",
        )),
    )
    .await;

    assert_matches!(
        result.unwrap_err(),
        AppError::Validation { field: "appointment_date", .. }
    );
}

#[tokio::test]
async fn booking_rejects_time_outside_hours() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());

    let doctor_id = Uuid::new_v4();
    let chamber_id = Uuid::new_v4();
    let schedule_id = Uuid::new_v4();

    mount_schedule(&mock_server, schedule_row(schedule_id, doctor_id, chamber_id, 20), schedule_id).await;

    let result = book_appointment(
        State(config.to_arc()),
        Json(booking_request(
            doctor_id,
            chamber_id,
            schedule_id,
            upcoming(Weekday::Mon),
            "18:00",
        )),
    )
    .await;

    assert_matches!(
        result.unwrap_err(),
        AppError::Validation { field: "appointment_time", .. }
    );
}

#[tokio::test]
async fn booking_rejects_full_schedule() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());

    let doctor_id = Uuid::new_v4();
    let chamber_id = Uuid::new_v4();
    let schedule_id = Uuid::new_v4();

    mount_schedule(&mock_server, schedule_row(schedule_id, doctor_id, chamber_id, 2), schedule_id).await;
    mount_slot_count(&mock_server, schedule_id, 2).await;

    let result = book_appointment(
        State(config.to_arc()),
        Json(booking_request(
            doctor_id,
            chamber_id,
            schedule_id,
            upcoming(Weekday::Mon),
            "10:30",
        )),
    )
    .await;

    assert_matches!(
        result.unwrap_err(),
        AppError::Validation { field: "schedule", .. }
    );
}

#[tokio::test]
async fn booking_rejects_taken_slot() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());

    let doctor_id = Uuid::new_v4();
    let chamber_id = Uuid::new_v4();
    let schedule_id = Uuid::new_v4();

    mount_schedule(&mock_server, schedule_row(schedule_id, doctor_id, chamber_id, 20), schedule_id).await;
    mount_slot_count(&mock_server, schedule_id, 3).await;
    mount_duplicate_check(&mock_server, doctor_id, true).await;

    let result = book_appointment(
        State(config.to_arc()),
        Json(booking_request(
            doctor_id,
            chamber_id,
            schedule_id,
            upcoming(Weekday::Mon),
            "10:30",
        )),
    )
    .await;

    assert_matches!(
        result.unwrap_err(),
        AppError::Validation { field: "appointment_time", .. }
    );
}

#[tokio::test]
async fn booking_race_surfaces_as_taken_slot() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());

    let doctor_id = Uuid::new_v4();
    let chamber_id = Uuid::new_v4();
    let schedule_id = Uuid::new_v4();

    mount_schedule(&mock_server, schedule_row(schedule_id, doctor_id, chamber_id, 20), schedule_id).await;
    mount_slot_count(&mock_server, schedule_id, 0).await;
    mount_duplicate_check(&mock_server, doctor_id, false).await;
    // Another booking won the race; the unique index rejects the insert.
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint"
        })))
        .mount(&mock_server)
        .await;

    let result = book_appointment(
        State(config.to_arc()),
        Json(booking_request(
            doctor_id,
            chamber_id,
            schedule_id,
            upcoming(Weekday::Mon),
            "10:30",
        )),
    )
    .await;

    assert_matches!(
        result.unwrap_err(),
        AppError::Validation { field: "appointment_time", .. }
    );
}

#[tokio::test]
async fn booking_rejects_past_date_without_touching_storage() {
    let config = TestConfig::default();

    let result = book_appointment(
        State(config.to_arc()),
        Json(booking_request(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            "10:30",
        )),
    )
    .await;

    assert_matches!(
        result.unwrap_err(),
        AppError::Validation { field: "appointment_date", .. }
    );
}

#[tokio::test]
async fn confirm_moves_pending_to_confirmed() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());
    let admin = TestUser::admin("admin@example.com");
    let token = JwtTestUtils::create_test_token(&admin, &config.jwt_secret, Some(24));

    let doctor_id = Uuid::new_v4();
    let chamber_id = Uuid::new_v4();
    let schedule_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();
    let date = upcoming(Weekday::Mon);

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, doctor_id, chamber_id, schedule_id, date, "pending")
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, doctor_id, chamber_id, schedule_id, date, "confirmed")
        ])))
        .mount(&mock_server)
        .await;

    let result = confirm_appointment(
        State(config.to_arc()),
        auth_header(&token),
        Path(appointment_id),
        Extension(admin.to_user()),
    )
    .await;

    let response = result.expect("confirm should succeed").0;
    assert_eq!(response["appointment"]["status"], "confirmed");
}

#[tokio::test]
async fn confirm_rejects_cancelled_appointment() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());
    let admin = TestUser::admin("admin@example.com");
    let token = JwtTestUtils::create_test_token(&admin, &config.jwt_secret, Some(24));

    let appointment_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(),
                upcoming(Weekday::Mon), "cancelled")
        ])))
        .mount(&mock_server)
        .await;

    let result = confirm_appointment(
        State(config.to_arc()),
        auth_header(&token),
        Path(appointment_id),
        Extension(admin.to_user()),
    )
    .await;

    assert_matches!(
        result.unwrap_err(),
        AppError::Validation { field: "appointment", .. }
    );
}

#[tokio::test]
async fn cancel_requires_a_reason() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());
    let admin = TestUser::admin("admin@example.com");
    let token = JwtTestUtils::create_test_token(&admin, &config.jwt_secret, Some(24));

    let appointment_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(),
                upcoming(Weekday::Mon), "pending")
        ])))
        .mount(&mock_server)
        .await;

    let result = cancel_appointment(
        State(config.to_arc()),
        auth_header(&token),
        Path(appointment_id),
        Extension(admin.to_user()),
        Json(CancelAppointmentRequest {
            cancellation_reason: Some("   ".to_string()),
        }),
    )
    .await;

    assert_matches!(
        result.unwrap_err(),
        AppError::Validation { field: "cancellation_reason", .. }
    );
}

#[tokio::test]
async fn cancel_rejects_already_cancelled() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());
    let admin = TestUser::admin("admin@example.com");
    let token = JwtTestUtils::create_test_token(&admin, &config.jwt_secret, Some(24));

    let appointment_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row(appointment_id, Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(),
                upcoming(Weekday::Mon), "cancelled")
        ])))
        .mount(&mock_server)
        .await;

    let result = cancel_appointment(
        State(config.to_arc()),
        auth_header(&token),
        Path(appointment_id),
        Extension(admin.to_user()),
        Json(CancelAppointmentRequest {
            cancellation_reason: Some("Doctor unavailable".to_string()),
        }),
    )
    .await;

    assert_matches!(
        result.unwrap_err(),
        AppError::Validation { field: "appointment", .. }
    );
}

#[tokio::test]
async fn list_appointments_rejects_non_admin() {
    let config = TestConfig::default();
    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, Some(24));

    let result = list_appointments(
        State(config.to_arc()),
        auth_header(&token),
        Query(AppointmentSearchQuery::default()),
        Extension(patient.to_user()),
    )
    .await;

    assert_matches!(result.unwrap_err(), AppError::Auth(_));
}

#[tokio::test]
async fn get_appointment_returns_embedded_relations() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_url(&mock_server.uri());

    let appointment_id = Uuid::new_v4();
    let schedule_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            detail_row(appointment_id, Uuid::new_v4(), Uuid::new_v4(), schedule_id,
                upcoming(Weekday::Mon), "pending")
        ])))
        .mount(&mock_server)
        .await;

    let result = get_appointment(State(config.to_arc()), Path(appointment_id)).await;

    let response = result.expect("get_appointment should succeed").0;
    assert_eq!(response["appointment"]["id"], appointment_id.to_string());
    assert_eq!(
        response["appointment"]["schedule"]["max_patients"],
        20
    );
}
