//! Mock EduLog backend for integration tests
//!
//! Serves the handful of endpoints the client cares about on an ephemeral
//! port and counts every hit so tests can assert on network traffic.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use edulog::auth::{RecordingNavigator, Session, SessionContext, TokenStore};
use edulog::ApiClient;

pub const ADMIN_EMAIL: &str = "a@x.com";
pub const STUDENT_EMAIL: &str = "ada@school.example";
pub const PASSWORD: &str = "pw";

pub const PROTECTED_PATH: &str = "/api/attendance/stats/total-students/";
pub const MISSING_PATH: &str = "/api/students/999/details/";
pub const UPCOMING_PATH: &str = "/api/events/upcoming/";

#[derive(Default)]
pub struct BackendState {
    pub login_hits: AtomicUsize,
    pub refresh_hits: AtomicUsize,
    pub protected_hits: AtomicUsize,
    pub auth_headers: Mutex<Vec<Option<String>>>,
    pub refresh_bodies: Mutex<Vec<Value>>,
    /// Method, path and JSON body of every maintenance call
    pub requests: Mutex<Vec<(String, String, Value)>>,
    valid_tokens: Mutex<HashSet<String>>,
    refresh_fails: AtomicBool,
    always_reject: AtomicBool,
    next_access: Mutex<String>,
    rotated_refresh: Mutex<Option<String>>,
    refresh_delay_ms: AtomicU64,
}

impl BackendState {
    pub fn accept_token(&self, token: &str) {
        self.valid_tokens.lock().insert(token.to_string());
    }

    /// Token handed out by the next successful refresh
    pub fn set_refreshed_token(&self, token: &str) {
        *self.next_access.lock() = token.to_string();
    }

    /// Hand out a new refresh token alongside the next access tokens
    pub fn rotate_refresh_to(&self, token: &str) {
        *self.rotated_refresh.lock() = Some(token.to_string());
    }

    /// Hold every refresh response back for `delay`
    pub fn slow_refresh(&self, delay: Duration) {
        self.refresh_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn fail_refresh(&self) {
        self.refresh_fails.store(true, Ordering::SeqCst);
    }

    /// Reject every bearer token, even freshly refreshed ones
    pub fn reject_all(&self) {
        self.always_reject.store(true, Ordering::SeqCst);
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_hits.load(Ordering::SeqCst)
    }

    pub fn protected_count(&self) -> usize {
        self.protected_hits.load(Ordering::SeqCst)
    }

    pub fn seen_requests(&self) -> Vec<(String, String, Value)> {
        self.requests.lock().clone()
    }

    pub fn seen_auth_headers(&self) -> Vec<Option<String>> {
        self.auth_headers.lock().clone()
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        if self.always_reject.load(Ordering::SeqCst) {
            return false;
        }
        bearer(headers)
            .map(|token| self.valid_tokens.lock().contains(&token))
            .unwrap_or(false)
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Given token not valid for any token type"})),
    )
        .into_response()
}

async fn login(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    state.login_hits.fetch_add(1, Ordering::SeqCst);

    if body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid credentials"})),
        )
            .into_response();
    }

    let reply = match body["email"].as_str() {
        Some(ADMIN_EMAIL) => json!({
            "access_token": "admin-access",
            "refresh_token": "admin-refresh",
            "role": "admin",
            "message": "Login successful"
        }),
        Some(STUDENT_EMAIL) => json!({
            "access_token": "student-access",
            "refresh_token": "student-refresh",
            "role": "student",
            "student_id": "S001",
            "student_name": "ada",
            "message": "Login successful"
        }),
        Some("weird@school.example") => json!({
            "access_token": "weird-access",
            "refresh_token": "weird-refresh",
            "role": "staff"
        }),
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Invalid credentials"})),
            )
                .into_response()
        }
    };

    state.accept_token(reply["access_token"].as_str().unwrap_or_default());
    Json(reply).into_response()
}

async fn refresh(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    state.refresh_hits.fetch_add(1, Ordering::SeqCst);
    state.refresh_bodies.lock().push(body);

    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if state.refresh_fails.load(Ordering::SeqCst) {
        return unauthorized();
    }

    let access = state.next_access.lock().clone();
    state.accept_token(&access);
    match state.rotated_refresh.lock().clone() {
        Some(refresh) => Json(json!({"access": access, "refresh": refresh})).into_response(),
        None => Json(json!({"access": access})).into_response(),
    }
}

async fn total_students(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.protected_hits.fetch_add(1, Ordering::SeqCst);
    state
        .auth_headers
        .lock()
        .push(headers.get("authorization").and_then(|v| v.to_str().ok()).map(String::from));

    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"total": 42})).into_response()
}

async fn missing_student() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Student not found"})),
    )
        .into_response()
}

async fn upcoming_events() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

fn remember(state: &BackendState, method: &Method, uri: &Uri, body: &Bytes) -> Value {
    let body: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    state
        .requests
        .lock()
        .push((method.to_string(), uri.path().to_string(), body.clone()));
    body
}

fn record_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "student_id": 12,
        "student_name": "ada",
        "date": "2024-10-01",
        "status": status,
        "clockInTime": "08:01:00",
        "clockOutTime": null
    })
}

async fn create_record(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let body = remember(&state, &method, &uri, &body);
    let status = body["status"].as_str().unwrap_or("present").to_string();
    (StatusCode::CREATED, Json(record_json(10, &status))).into_response()
}

async fn record_by_id(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let body = remember(&state, &method, &uri, &body);
    let status = body["status"].as_str().unwrap_or("present").to_string();
    Json(record_json(id, &status)).into_response()
}

async fn event_by_id(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let body = remember(&state, &method, &uri, &body);
    Json(json!({
        "id": id,
        "title": body["title"],
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "date": body["date"],
        "location": body.get("location").cloned().unwrap_or(Value::Null)
    }))
    .into_response()
}

async fn departments(State(state): State<Arc<BackendState>>, method: Method, uri: Uri) -> Response {
    remember(&state, &method, &uri, &Bytes::new());
    Json(json!([{"id": 1, "name": "Physics"}, {"id": 2, "name": "History"}])).into_response()
}

async fn percentages(State(state): State<Arc<BackendState>>, method: Method, uri: Uri) -> Response {
    remember(&state, &method, &uri, &Bytes::new());
    Json(json!([{"id": 3, "username": "ada", "attendance_percentage": 87.5}])).into_response()
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<BackendState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());
        state.set_refreshed_token("fresh-access");

        let app = Router::new()
            .route("/api/login/", post(login))
            .route("/token/refresh/", post(refresh))
            .route(PROTECTED_PATH, get(total_students))
            .route(MISSING_PATH, get(missing_student))
            .route(UPCOMING_PATH, get(upcoming_events))
            .route("/api/attendance/records/", post(create_record))
            .route(
                "/api/attendance/records/{id}/",
                get(record_by_id).patch(record_by_id),
            )
            .route("/api/events/{id}/", put(event_by_id))
            .route("/departments/", get(departments))
            .route("/api/attendance/stats/percentage/", get(percentages))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Client with an empty in-memory session
    pub fn client(&self) -> (ApiClient, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::new());
        let context = SessionContext::new(TokenStore::in_memory(), navigator.clone());
        let client = ApiClient::new(&self.base_url, context).expect("client");
        (client, navigator)
    }

    /// Client whose store already holds `session`
    pub fn client_with(&self, session: &Session) -> (ApiClient, Arc<RecordingNavigator>) {
        let (client, navigator) = self.client();
        client.session().store().set(session).expect("seed session");
        (client, navigator)
    }
}

pub fn admin_session(access: &str, refresh: &str) -> Session {
    Session {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        role: edulog::auth::Role::Admin,
        student_id: None,
        student_name: None,
        issued_at: chrono::Utc::now(),
    }
}
