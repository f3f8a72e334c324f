//! Authenticated session handed to the API client.
//!
//! The session is an explicit value: it is loaded from the credential store
//! once, passed into [`crate::api::ApiClient`], and never read ad hoc from
//! global state.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::Zeroize;

use crate::data_helpers::value_str;
use crate::error::{AppError, AppResult};

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// User record as returned by the login endpoint.
    #[serde(default)]
    pub user: Value,
}

impl Session {
    /// Build a session from the `login/` response.
    ///
    /// The backend either answers `{ "success": true, ...user }` (cookie
    /// session) or hands out JWT tokens under `access` / `refresh`.
    pub fn from_login_response(body: &Value) -> AppResult<Self> {
        let access_token = value_str(body, &["access", "access_token", "token"]);
        let refresh_token = value_str(body, &["refresh", "refresh_token"]);
        let success = body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if !success && access_token.is_none() {
            let message = value_str(body, &["message", "detail", "error"])
                .unwrap_or_else(|| "Login failed".to_string());
            return Err(AppError::Validation(message));
        }

        let user = match body.get("user") {
            Some(u) if u.is_object() => u.clone(),
            _ => {
                let mut user = body.clone();
                if let Some(obj) = user.as_object_mut() {
                    for key in ["access", "access_token", "token", "refresh", "refresh_token"] {
                        obj.remove(key);
                    }
                }
                user
            }
        };

        Ok(Self {
            access_token,
            refresh_token,
            user,
        })
    }

    pub fn bearer(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Best human-readable name for the logged-in user.
    pub fn display_name(&self) -> String {
        if let Some(name) = value_str(&self.user, &["username"]) {
            return name;
        }
        let first = value_str(&self.user, &["first_name"]).unwrap_or_default();
        let last = value_str(&self.user, &["last_name"]).unwrap_or_default();
        let full = format!("{first} {last}").trim().to_string();
        if !full.is_empty() {
            return full;
        }
        value_str(&self.user, &["email"]).unwrap_or_else(|| "unknown".to_string())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.access_token.zeroize();
        self.refresh_token.zeroize();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("user", &self.display_name())
            .finish()
    }
}
