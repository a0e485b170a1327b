//! End-to-end tests driving the full router against an in-memory database

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use dgh_care::api::ApiServer;
use dgh_care::auth::{hash_password, Claims};
use dgh_care::core::{Config, Delivery, Notifier};
use dgh_care::db::repository::{DoctorDraft, PatientDraft};
use dgh_care::db::{seed, CredentialRepository, DatabaseManager, DoctorRepository, FeedbackRepository, PatientRepository};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

const SECRET: &str = "integration-test-secret-0123";
const TEST_COST: u32 = 4;

/// Records messages instead of sending them
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_sms(&self, to: &str, body: &str) -> dgh_care::core::Result<Delivery> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(Delivery::Sent("SM-test".to_string()))
    }
}

struct TestApp {
    router: Router,
    db: Arc<DatabaseManager>,
    notifier: Arc<RecordingNotifier>,
    doctor_id: i64,
    patient_id: i64,
}

async fn setup() -> TestApp {
    let config = Config::from_toml_str(&format!(
        "[security]\njwt_secret = \"{}\"\nbcrypt_cost = {}\n",
        SECRET, TEST_COST
    ))
    .unwrap();
    let db = Arc::new(DatabaseManager::new_in_memory().unwrap());

    let credentials = CredentialRepository::new(db.clone());
    credentials
        .create_admin(
            "admin@example.com",
            &hash_password("adminpw", TEST_COST).unwrap(),
            Some("Admin".to_string()),
        )
        .await
        .unwrap();

    let doctor_id = DoctorRepository::new(db.clone())
        .create(DoctorDraft {
            name: "Dr Ekane".to_string(),
            specialty: "Cardiology".to_string(),
            email: "doc@example.com".to_string(),
            password_hash: Some(hash_password("pw123", TEST_COST).unwrap()),
        })
        .await
        .unwrap();

    let patient_id = PatientRepository::new(db.clone())
        .register(PatientDraft {
            email: "pat@example.com".to_string(),
            password_hash: hash_password("patpw1", TEST_COST).unwrap(),
            first_name: "Ada".to_string(),
            last_name: "Ngo".to_string(),
            phone_number: Some("+237600000001".to_string()),
        })
        .await
        .unwrap();

    seed::seed_feedback_categories(&FeedbackRepository::new(db.clone()))
        .await
        .unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let router = ApiServer::new(config, db.clone(), notifier.clone())
        .await
        .unwrap()
        .into_router();

    TestApp {
        router,
        db,
        notifier,
        doctor_id,
        patient_id,
    }
}

async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value, axum::http::HeaderMap) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value, headers)
}

async fn login(app: &TestApp, email: &str, password: &str) -> String {
    let (status, body, _) = send(
        app,
        Method::POST,
        "/auth/token",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["access_token"].as_str().unwrap().to_string()
}

fn forge_token(secret: &str, sub: &str, role: &str, exp_offset: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: sub.to_string(),
        role: Some(role.to_string()),
        iat: now,
        exp: now + exp_offset,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

#[tokio::test]
async fn test_doctor_login_and_me() {
    let app = setup().await;

    let (status, body, _) = send(
        &app,
        Method::POST,
        "/auth/token",
        None,
        Some(json!({ "email": "  Doc@Example.com ", "password": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user_role"], "doctor");
    assert_eq!(body["user_id"], app.doctor_id);
    assert_eq!(body["name"], "Dr Ekane");

    let token = body["access_token"].as_str().unwrap();
    let (status, me, _) = send(&app, Method::GET, "/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], app.doctor_id);
    assert_eq!(me["role"], "doctor");
    assert_eq!(me["email"], "doc@example.com");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = setup().await;

    let (unknown_status, unknown, _) = send(
        &app,
        Method::POST,
        "/auth/token",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "pw123" })),
    )
    .await;
    let (wrong_status, wrong, headers) = send(
        &app,
        Method::POST,
        "/auth/token",
        None,
        Some(json!({ "email": "doc@example.com", "password": "nope" })),
    )
    .await;

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown["error"], wrong["error"]);
    assert_eq!(unknown["message"], wrong["message"]);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
}

#[tokio::test]
async fn test_patient_registration() {
    let app = setup().await;
    let body = json!({
        "email": "New@Example.com",
        "password": "secret1",
        "first_name": "Eko",
        "last_name": "Manga",
    });

    let (status, created, _) =
        send(&app, Method::POST, "/auth/patient", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["patient_id"].as_i64().unwrap() > 0);

    let (status, _, _) = send(&app, Method::POST, "/auth/patient", None, Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let count: i64 = app
        .db
        .execute(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM patients WHERE email = 'new@example.com'",
                [],
                |row| row.get(0),
            )?)
        })
        .await
        .unwrap();
    assert_eq!(count, 1);

    let token = login(&app, "new@example.com", "secret1").await;
    let (_, me, _) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(me["role"], "patient");
    assert_eq!(me["name"], "Eko Manga");
}

#[tokio::test]
async fn test_rejected_tokens() {
    let app = setup().await;
    let doctor_sub = app.doctor_id.to_string();

    let (status, body, headers) = send(&app, Method::GET, "/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authenticated");
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");

    let expired = forge_token(SECRET, &doctor_sub, "doctor", -60);
    let (status, _, headers) = send(&app, Method::GET, "/auth/me", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");

    let foreign = forge_token("some-other-secret-value", &doctor_sub, "doctor", 600);
    let (status, _, _) = send(&app, Method::GET, "/auth/me", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let missing_record = forge_token(SECRET, "9999", "doctor", 600);
    let (status, _, _) = send(&app, Method::GET, "/auth/me", Some(&missing_record), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let unknown_role = forge_token(SECRET, &doctor_sub, "janitor", 600);
    let (status, _, _) = send(&app, Method::GET, "/auth/me", Some(&unknown_role), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_gates() {
    let app = setup().await;
    let patient = login(&app, "pat@example.com", "patpw1").await;
    let doctor = login(&app, "doc@example.com", "pw123").await;
    let admin = login(&app, "admin@example.com", "adminpw").await;

    let (status, _, _) = send(&app, Method::GET, "/patients", Some(&patient), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, list, _) = send(&app, Method::GET, "/patients", Some(&doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let new_doctor = json!({
        "name": "Dr Fon",
        "specialty": "Pediatrics",
        "email": "fon@example.com",
        "password": "fonpw1",
    });
    let (status, _, _) =
        send(&app, Method::POST, "/doctor", Some(&doctor), Some(new_doctor.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, created, _) =
        send(&app, Method::POST, "/doctor", Some(&admin), Some(new_doctor.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], "fon@example.com");
    assert_eq!(created["patientCount"], 0);
    let (status, _, _) =
        send(&app, Method::POST, "/doctor", Some(&admin), Some(new_doctor)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/patients/{}/status", app.patient_id);
    let (status, toggled, _) = send(&app, Method::PATCH, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["is_active"], false);
}

#[tokio::test]
async fn test_public_doctor_directory() {
    let app = setup().await;

    let (status, doctors, _) = send(&app, Method::GET, "/doctor?specialty=cardiology", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doctors.as_array().unwrap().len(), 1);

    let (status, profile, _) =
        send(&app, Method::GET, "/doctor/profile?email=DOC@example.com", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"], app.doctor_id);

    let (status, _, _) = send(&app, Method::GET, "/doctor/profile?email=", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, Method::GET, "/doctor/424242", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_appointment_lifecycle() {
    let app = setup().await;
    let token = login(&app, "doc@example.com", "pw123").await;

    let (status, created, _) = send(
        &app,
        Method::POST,
        "/appointments",
        Some(&token),
        Some(json!({
            "patient_id": app.patient_id,
            "doctor_id": app.doctor_id,
            "date": "2999-06-01",
            "time": "10:30",
            "category": "Emergency",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "scheduled");
    assert_eq!(created["patient_name"], "Ada Ngo");
    let id = created["id"].as_i64().unwrap();

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/appointments",
        Some(&token),
        Some(json!({
            "patient_id": app.patient_id,
            "doctor_id": app.doctor_id,
            "date": "2001-06-01",
            "time": "10:30",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/appointments/public?doctor_id={}", app.doctor_id);
    let (status, public, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public.as_array().unwrap().len(), 1);

    let uri = format!("/appointments/{}", id);
    let (status, _, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feedback_flow() {
    let app = setup().await;
    let token = login(&app, "pat@example.com", "patpw1").await;

    let (status, categories, _) =
        send(&app, Method::GET, "/feedback/feedback_categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let category_id = categories[0]["id"].as_i64().unwrap();

    let mut body = json!({
        "patient_id": app.patient_id,
        "doctor_id": app.doctor_id,
        "category_id": category_id,
        "rating": 6,
        "comment": "Great",
    });
    let (status, _, _) = send(&app, Method::POST, "/feedback", Some(&token), Some(body.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    body["rating"] = json!(4);
    let (status, created, _) = send(&app, Method::POST, "/feedback", Some(&token), Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["doctor"]["averageRating"], 4.0);

    body["category_id"] = json!(9999);
    let (status, _, _) = send(&app, Method::POST, "/feedback", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/feedback?doctor_id={}", app.doctor_id);
    let (status, listed, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["patient"]["first_name"], "Ada");
}

#[tokio::test]
async fn test_reminders_send_sms_and_soft_delete() {
    let app = setup().await;
    let token = login(&app, "doc@example.com", "pw123").await;

    let (status, _, _) = send(&app, Method::GET, "/reminders", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, reminder, _) = send(
        &app,
        Method::POST,
        "/reminders",
        Some(&token),
        Some(json!({
            "patient_id": app.patient_id,
            "medication": "Metformin",
            "time": "08:00",
            "frequency": "daily",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reminder["is_active"], true);
    let id = reminder["id"].as_i64().unwrap();

    // The SMS is dispatched on a spawned task
    for _ in 0..50 {
        if !app.notifier.sent.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    {
        let sent = app.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+237600000001");
        assert!(sent[0].1.starts_with("Reminder: Take your Metformin at 08:00 (daily)."));
    }

    let list_uri = format!("/reminders?patient_id={}", app.patient_id);
    let (_, active, _) = send(&app, Method::GET, &list_uri, Some(&token), None).await;
    assert_eq!(active.as_array().unwrap().len(), 1);

    let (status, deleted, _) =
        send(&app, Method::DELETE, &format!("/reminders/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["detail"], "Reminder successfully deleted");

    let (_, active, _) = send(&app, Method::GET, &list_uri, Some(&token), None).await;
    assert!(active.as_array().unwrap().is_empty());

    let (status, _, _) = send(&app, Method::GET, "/reminders?patient_id=9999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_statistics_are_public() {
    let app = setup().await;

    let (status, cards, _) = send(&app, Method::GET, "/statistics/hospital", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cards.as_array().unwrap().len(), 4);
    assert_eq!(cards[0]["title"], "Total Patients");
    assert_eq!(cards[0]["value"], "1");
    assert!(cards[0]["icon"]["bgColor"].is_string());

    let (status, doctors, _) = send(&app, Method::GET, "/statistics/doctors", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doctors["totalDoctors"], 1);
    assert_eq!(doctors["specialties"][0]["name"], "Cardiology");

    let (status, outcomes, _) =
        send(&app, Method::GET, "/statistics/treatment-outcomes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcomes.as_array().unwrap().len(), 3);

    let (status, admissions, _) =
        send(&app, Method::GET, "/statistics/patient-admissions", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(admissions[0]["name"], "Jan");

    let (status, departments, _) =
        send(&app, Method::GET, "/statistics/departments", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(departments[0]["doctors"], 1);
}

#[tokio::test]
async fn test_medication_lifecycle() {
    let app = setup().await;
    let token = login(&app, "doc@example.com", "pw123").await;

    let body = json!({
        "patient_id": app.patient_id,
        "doctor_id": app.doctor_id,
        "medication": "Amoxicillin",
        "dosage": "500mg",
        "frequency": "Twice daily",
        "start_date": "2024-01-01",
        "end_date": "2024-01-10",
    });

    let mut missing_patient = body.clone();
    missing_patient["patient_id"] = json!(9999);
    let (status, error, _) =
        send(&app, Method::POST, "/medications", Some(&token), Some(missing_patient)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "NotFoundError");

    let mut missing_doctor = body.clone();
    missing_doctor["doctor_id"] = json!(9999);
    let (status, _, _) =
        send(&app, Method::POST, "/medications", Some(&token), Some(missing_doctor)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for field in ["medication", "dosage", "frequency"] {
        let mut blank = body.clone();
        blank[field] = json!("   ");
        let (status, error, _) =
            send(&app, Method::POST, "/medications", Some(&token), Some(blank)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "blank {}", field);
        assert_eq!(error["error"], "ValidationError");
    }

    let mut reversed = body.clone();
    reversed["end_date"] = json!("2023-12-31");
    let (status, _, _) = send(&app, Method::POST, "/medications", Some(&token), Some(reversed)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created, _) =
        send(&app, Method::POST, "/medications", Some(&token), Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["doctor_name"], "Dr Ekane");
    assert_eq!(created["patient_name"], "Ada Ngo");
    assert_eq!(created["dosage"], "500mg");
    let id = created["id"].as_i64().unwrap();

    let uri = format!("/medications?patient_id={}", app.patient_id);
    let (status, listed, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let uri = format!("/medications/{}", id);
    let mut changed = body.clone();
    changed["dosage"] = json!("250mg");
    let (status, updated, _) = send(&app, Method::PUT, &uri, Some(&token), Some(changed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["dosage"], "250mg");

    let (status, _, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_input_gets_json_400() {
    let app = setup().await;

    let (status, error, headers) = send(
        &app,
        Method::POST,
        "/auth/token",
        None,
        Some(json!({ "email": "doc@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(error["error"], "ValidationError");
    assert!(error["message"].as_str().unwrap().contains("password"));
    assert!(error["trace_id"].is_string());

    let (status, error, _) = send(
        &app,
        Method::POST,
        "/auth/patient",
        None,
        Some(json!({ "email": "new@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "ValidationError");

    let token = login(&app, "admin@example.com", "adminpw").await;
    let (status, error, _) = send(&app, Method::GET, "/appointments/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "ValidationError");

    let (status, error, _) =
        send(&app, Method::GET, "/appointments?doctor_id=x", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "ValidationError");
}

#[tokio::test]
async fn test_unknown_path_is_404_without_token() {
    let app = setup().await;

    let (status, _, headers) = send(&app, Method::GET, "/no-such-route", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(headers.get(header::WWW_AUTHENTICATE).is_none());

    let (status, _, _) = send(&app, Method::GET, "/patients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
