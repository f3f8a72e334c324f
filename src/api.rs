//! Sales backend API client.
//!
//! Provides authenticated HTTP communication with the RCC Kit portal: login,
//! enquiries, kit dispatch lots, percentage dispatch lots and order documents.
//! All collection endpoints filter by the order's `sr` query parameter.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::data_helpers::value_str;
use crate::documents::DocumentKind;
use crate::error::{AppError, AppResult};
use crate::models::{
    soft_delete_patch, DispatchLot, Document, KitDispatchLot, NewDispatchLot, NewKitDispatchLot,
    Order,
};
use crate::session::Session;

const LOGIN_PATH: &str = "login/";
const LOGOUT_PATH: &str = "logout/";
const ENQUIRY_PATH: &str = "enquiry/";
const KIT_DISPATCH_PATH: &str = "kit-dispatch/";
const DISPATCH_LOTS_PATH: &str = "dispatch-lots/";

/// Extra attempts for idempotent reads that failed before reaching the server.
const GET_RETRIES: u32 = 2;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Convert a `reqwest::Error` into a user-friendly message.
fn friendly_error(url: &str, err: &reqwest::Error) -> AppError {
    if err.is_connect() {
        return AppError::Network(format!("Cannot reach server at {url}"));
    }
    if err.is_timeout() {
        return AppError::Network(format!("Connection to {url} timed out"));
    }
    if err.is_builder() {
        return AppError::Config(format!("Invalid server URL: {url}"));
    }
    AppError::Transport(format!("Network error communicating with {url}: {err}"))
}

/// Convert an HTTP status code into a user-friendly message.
fn status_error(status: StatusCode) -> String {
    match status.as_u16() {
        403 => "You are not allowed to do this".to_string(),
        404 => "Record not found".to_string(),
        s if s >= 500 => format!("Server error (HTTP {s})"),
        s => format!("Unexpected response from server (HTTP {s})"),
    }
}

/// Collection endpoints answer either a bare array or a DRF page.
fn unwrap_list(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct ApiClient {
    base_url: String,
    http: Client,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(config: &AppConfig, session: Option<Session>) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            base_url: config.api_base_url.clone(),
            http,
            session,
        })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Perform one request against the backend and return the JSON body
    /// (`Value::Null` for empty responses).
    ///
    /// GET requests are retried with exponential backoff when the server
    /// could not be reached; writes are sent exactly once.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> AppResult<Value> {
        let url = self.url(path);
        let max_attempts = if method == Method::GET { GET_RETRIES + 1 } else { 1 };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send_once(method.clone(), &url, query, body).await {
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = RETRY_BASE_DELAY * 2u32.pow(attempt - 1);
                    warn!(
                        %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> AppResult<Value> {
        debug!(%method, %url, "api request");
        let mut req = self
            .http
            .request(method, url)
            .header("Accept", "application/json");
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = self.session.as_ref().and_then(Session::bearer) {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| friendly_error(&self.base_url, &e))?;
        let status = resp.status();
        let body_text = resp.text().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::Unauthorized);
        }
        if !status.is_success() {
            // Preserve the server's explanation when it sends one.
            let message = serde_json::from_str::<Value>(&body_text)
                .ok()
                .and_then(|json| value_str(&json, &["message", "detail", "error"]))
                .unwrap_or_else(|| status_error(status));
            return Err(AppError::Http {
                status: status.as_u16(),
                message,
            });
        }

        if body_text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body_text).map_err(|e| AppError::Decode(e.to_string()))
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<Vec<T>> {
        let body = self.send(Method::GET, path, query, None).await?;
        unwrap_list(body)
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(AppError::from))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    /// POST credentials to `login/` and return the raw response body.
    ///
    /// A rejected login that still answers JSON (`{ success: false }`) is
    /// returned as-is so the caller can surface the server message.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<Value> {
        let body = serde_json::json!({ "username": username, "password": password });
        match self.send(Method::POST, LOGIN_PATH, &[], Some(&body)).await {
            Err(AppError::Http { message, .. }) => Ok(serde_json::json!({
                "success": false,
                "message": message,
            })),
            Err(AppError::Unauthorized) => Ok(serde_json::json!({
                "success": false,
                "message": "Invalid username or password",
            })),
            other => other,
        }
    }

    pub async fn logout(&self) -> AppResult<()> {
        let body = match self.session.as_ref().and_then(|s| s.refresh_token.as_deref()) {
            Some(refresh) => serde_json::json!({ "refresh": refresh }),
            None => serde_json::json!({}),
        };
        self.send(Method::POST, LOGOUT_PATH, &[], Some(&body))
            .await
            .map(|_| ())
    }

    // -----------------------------------------------------------------------
    // Enquiries / orders
    // -----------------------------------------------------------------------

    /// Every order visible to the user. `enquiry/` is the single listing
    /// endpoint; confirmed orders are enquiries too.
    pub async fn list_enquiries(&self) -> AppResult<Vec<Order>> {
        let orders: Vec<Order> = self.get_list(ENQUIRY_PATH, &[]).await?;
        info!(count = orders.len(), "fetched enquiries");
        Ok(orders)
    }

    pub async fn get_enquiry(&self, id: &str) -> AppResult<Order> {
        let body = self
            .send(Method::GET, &format!("{ENQUIRY_PATH}{id}/"), &[], None)
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn create_enquiry(&self, payload: &Value) -> AppResult<Value> {
        self.send(Method::POST, ENQUIRY_PATH, &[], Some(payload)).await
    }

    pub async fn patch_enquiry(&self, id: &str, patch: &Value) -> AppResult<Value> {
        self.send(
            Method::PATCH,
            &format!("{ENQUIRY_PATH}{id}/"),
            &[],
            Some(patch),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Kit dispatch lots
    // -----------------------------------------------------------------------

    pub async fn kit_dispatch_lots(&self, sr: &str) -> AppResult<Vec<KitDispatchLot>> {
        self.get_list(KIT_DISPATCH_PATH, &[("sr", sr)]).await
    }

    pub async fn create_kit_dispatch_lot(&self, lot: &NewKitDispatchLot) -> AppResult<Value> {
        self.send(Method::POST, KIT_DISPATCH_PATH, &[], Some(&lot.to_payload()))
            .await
    }

    // -----------------------------------------------------------------------
    // Percentage dispatch lots
    // -----------------------------------------------------------------------

    pub async fn dispatch_lots(&self, sr: &str) -> AppResult<Vec<DispatchLot>> {
        self.get_list(DISPATCH_LOTS_PATH, &[("sr", sr)]).await
    }

    pub async fn create_dispatch_lot(&self, lot: &NewDispatchLot) -> AppResult<Value> {
        let body = serde_json::to_value(lot)?;
        self.send(Method::POST, DISPATCH_LOTS_PATH, &[], Some(&body))
            .await
    }

    pub async fn soft_delete_dispatch_lot(&self, id: &str) -> AppResult<Value> {
        self.send(
            Method::PATCH,
            &format!("{DISPATCH_LOTS_PATH}{id}/"),
            &[],
            Some(&soft_delete_patch()),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    pub async fn documents(&self, kind: DocumentKind, sr: &str) -> AppResult<Vec<Document>> {
        self.get_list(kind.endpoint(), &[("sr", sr)]).await
    }

    pub async fn soft_delete_document(&self, kind: DocumentKind, id: &str) -> AppResult<Value> {
        self.send(
            Method::PATCH,
            &format!("{}{id}/", kind.endpoint()),
            &[],
            Some(&soft_delete_patch()),
        )
        .await
    }
}
