//! In-process stand-in for the sales backend, used by the api and commands
//! tests. Collections are kept in memory and filtered by `?sr=` like the real
//! service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::documents::DocumentKind;

const COLLECTIONS: &[&str] = &[
    "enquiry",
    "kit-dispatch",
    "dispatch-lots",
    "qc-docs",
    "dispatch-docs",
];

#[derive(Default)]
struct Inner {
    users: HashMap<String, String>,
    collections: HashMap<String, Vec<Value>>,
    required_token: Option<String>,
    last_auth: Option<String>,
    write_failure: Option<(u16, Value)>,
    read_failure_after_write: Option<(u16, Value)>,
    stalls: usize,
    stall_for: Duration,
    requests: usize,
    writes: usize,
    next_id: i64,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MockBackend {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_user(&self, username: &str, password: &str) {
        self.lock()
            .users
            .insert(username.to_string(), password.to_string());
    }

    /// Reject every request that does not carry `Bearer <token>`.
    pub fn require_token(&self, token: &str) {
        self.lock().required_token = Some(token.to_string());
    }

    pub fn fail_writes_with(&self, status: u16, body: Value) {
        self.lock().write_failure = Some((status, body));
    }

    /// Once anything has been written, collection reads answer `status`.
    pub fn fail_reads_after_write(&self, status: u16, body: Value) {
        self.lock().read_failure_after_write = Some((status, body));
    }

    /// Hold the next `count` collection requests for `delay` before answering.
    pub fn stall_requests(&self, count: usize, delay: Duration) {
        let mut inner = self.lock();
        inner.stalls = count;
        inner.stall_for = delay;
    }

    fn take_stall(&self) -> Option<Duration> {
        let mut inner = self.lock();
        if inner.stalls == 0 {
            return None;
        }
        inner.stalls -= 1;
        Some(inner.stall_for)
    }

    pub fn push(&self, collection: &str, item: Value) {
        self.lock()
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(item);
    }

    pub fn push_enquiry(&self, item: Value) {
        self.push("enquiry", item);
    }

    pub fn push_kit_lot(&self, item: Value) {
        self.push("kit-dispatch", item);
    }

    pub fn push_dispatch_lot(&self, item: Value) {
        self.push("dispatch-lots", item);
    }

    pub fn push_document(&self, kind: DocumentKind, item: Value) {
        self.push(kind.endpoint().trim_end_matches('/'), item);
    }

    pub fn items(&self, collection: &str) -> Vec<Value> {
        self.lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.lock().last_auth.clone()
    }

    pub fn requests(&self) -> usize {
        self.lock().requests
    }

    /// POST/PATCH calls against collections.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }
}

pub async fn spawn_backend(backend: MockBackend) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend addr");
    let app = Router::new()
        .route("/api/:collection/", get(list).post(create))
        .route("/api/:collection/:id/", get(fetch).patch(patch))
        .with_state(backend);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/api/")
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn guard(backend: &MockBackend, headers: &HeaderMap, write: bool) -> Result<(), Response> {
    let mut inner = backend.lock();
    inner.requests += 1;
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    inner.last_auth = auth.clone();

    if let Some(required) = inner.required_token.as_deref() {
        let expected = format!("Bearer {required}");
        if auth.as_deref() != Some(expected.as_str()) {
            return Err(error(
                StatusCode::UNAUTHORIZED,
                json!({ "detail": "Given token not valid" }),
            ));
        }
    }
    if write {
        inner.writes += 1;
        if let Some((status, body)) = inner.write_failure.clone() {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);
            return Err(error(status, body));
        }
    } else if inner.writes > 0 {
        if let Some((status, body)) = inner.read_failure_after_write.clone() {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);
            return Err(error(status, body));
        }
    }
    Ok(())
}

async fn stall(backend: &MockBackend) {
    if let Some(delay) = backend.take_stall() {
        tokio::time::sleep(delay).await;
    }
}

fn known(collection: &str) -> Result<(), Response> {
    if COLLECTIONS.contains(&collection) {
        Ok(())
    } else {
        Err(error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." })))
    }
}

async fn list(
    State(backend): State<MockBackend>,
    Path(collection): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = known(&collection).and_then(|_| guard(&backend, &headers, false)) {
        return resp;
    }
    stall(&backend).await;
    let items: Vec<Value> = backend
        .items(&collection)
        .into_iter()
        .filter(|item| match query.get("sr") {
            Some(sr) => item.get("sr").and_then(as_text).as_deref() == Some(sr.as_str()),
            None => true,
        })
        .collect();
    Json(Value::Array(items)).into_response()
}

async fn create(
    State(backend): State<MockBackend>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    match collection.as_str() {
        "login" => return login(&backend, &body),
        "logout" => {
            backend.lock().requests += 1;
            return Json(json!({ "success": true })).into_response();
        }
        _ => {}
    }
    if let Err(resp) = known(&collection).and_then(|_| guard(&backend, &headers, true)) {
        return resp;
    }
    stall(&backend).await;

    let mut item = body;
    {
        let mut inner = backend.lock();
        inner.next_id += 1;
        let id = 1000 + inner.next_id;
        if let Some(obj) = item.as_object_mut() {
            obj.entry("id").or_insert(json!(id));
        }
        inner
            .collections
            .entry(collection)
            .or_default()
            .push(item.clone());
    }
    (StatusCode::CREATED, Json(item)).into_response()
}

fn login(backend: &MockBackend, body: &Value) -> Response {
    let mut inner = backend.lock();
    inner.requests += 1;
    let username = body.get("username").and_then(Value::as_str).unwrap_or("");
    let password = body.get("password").and_then(Value::as_str).unwrap_or("");
    match inner.users.get(username) {
        Some(expected) if expected == password => Json(json!({
            "success": true,
            "username": username,
            "access": format!("tok-{username}"),
            "refresh": format!("ref-{username}"),
        }))
        .into_response(),
        _ => error(
            StatusCode::BAD_REQUEST,
            json!({ "success": false, "message": "Invalid credentials" }),
        ),
    }
}

async fn fetch(
    State(backend): State<MockBackend>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = known(&collection).and_then(|_| guard(&backend, &headers, false)) {
        return resp;
    }
    backend
        .items(&collection)
        .into_iter()
        .find(|item| item.get("id").and_then(as_text).as_deref() == Some(id.as_str()))
        .map(|item| Json(item).into_response())
        .unwrap_or_else(|| error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." })))
}

async fn patch(
    State(backend): State<MockBackend>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = known(&collection).and_then(|_| guard(&backend, &headers, true)) {
        return resp;
    }
    let mut inner = backend.lock();
    let Some(items) = inner.collections.get_mut(&collection) else {
        return error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." }));
    };
    let Some(item) = items
        .iter_mut()
        .find(|item| item.get("id").and_then(as_text).as_deref() == Some(id.as_str()))
    else {
        return error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." }));
    };
    if let (Some(target), Some(changes)) = (item.as_object_mut(), body.as_object()) {
        for (k, v) in changes {
            target.insert(k.clone(), v.clone());
        }
    }
    Json(item.clone()).into_response()
}
