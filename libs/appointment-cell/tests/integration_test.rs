use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes;
use appointment_cell::state::SchedulerState;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockStoreResponses, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> Router {
    appointment_routes(SchedulerState::new(std::sync::Arc::new(config)))
}

fn next_monday() -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(1);
    while date.weekday() != Weekday::Mon {
        date += Duration::days(1);
    }
    date
}

async fn setup_booking_mocks(server: &MockServer, patient_id: &str, doctor_id: &str, date: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_row(
                doctor_id,
                &["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"],
                "09:00",
                "17:00",
            )
        ])))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::appointment_row(
                &Uuid::new_v4().to_string(),
                patient_id,
                doctor_id,
                date,
                "10:00",
                "10:30",
                "scheduled",
            )
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn booking_a_free_slot_returns_201() {
    let server = MockServer::start().await;
    let user = TestUser::patient("patient@example.com");
    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    let doctor_id = Uuid::new_v4();
    let date = next_monday();
    setup_booking_mocks(&server, &user.id, &doctor_id.to_string(), &date.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("select", "id,start_time,end_time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let body = json!({
        "doctor_id": doctor_id,
        "date": date,
        "start_time": "10:00",
        "end_time": "10:30",
        "reason": "Routine check-up"
    });

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = create_test_app(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn booking_a_taken_slot_returns_409() {
    let server = MockServer::start().await;
    let user = TestUser::patient("patient@example.com");
    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    let doctor_id = Uuid::new_v4();
    let date = next_monday();
    setup_booking_mocks(&server, &user.id, &doctor_id.to_string(), &date.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("select", "id,start_time,end_time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row(
                &Uuid::new_v4().to_string(),
                &Uuid::new_v4().to_string(),
                &doctor_id.to_string(),
                &date.to_string(),
                "10:00",
                "10:30",
                "scheduled",
            )
        ])))
        .mount(&server)
        .await;

    let body = json!({
        "doctor_id": doctor_id,
        "date": date,
        "start_time": "10:00",
        "end_time": "10:30",
        "reason": "Routine check-up"
    });

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = create_test_app(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let config = TestConfig::default().to_app_config();

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn patients_cannot_list_the_doctor_calendar() {
    let user = TestUser::patient("patient@example.com");
    let config = TestConfig::default().to_app_config();
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    let request = Request::builder()
        .method("GET")
        .uri("/doctor")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn listing_own_appointments_returns_count_and_rows() {
    let server = MockServer::start().await;
    let user = TestUser::patient("patient@example.com");
    let config = TestConfig::with_supabase_url(&server.uri()).to_app_config();
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    let date = next_monday();
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("patient_id", format!("eq.{}", user.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row(
                &Uuid::new_v4().to_string(),
                &user.id,
                &Uuid::new_v4().to_string(),
                &date.to_string(),
                "10:00",
                "10:30",
                "scheduled",
            )
        ])))
        .mount(&server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["count"], json!(1));
}
