use serde_json::Value;

use super::{failure, Alert};
use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::{auth, storage};

pub async fn login(config: &AppConfig, username: &str, password: String) -> Result<Value, Alert> {
    let session = auth::login(config, username, password)
        .await
        .map_err(|e| match e {
            // Wrong credentials come back as a validation error carrying the
            // server's message.
            AppError::Validation(message) => Alert::new("Login failed", message),
            other => failure("auth_login", "Unable to log in. Please try again.", other),
        })?;

    storage::save_session(&session)
        .map_err(|e| failure("auth_login", "Logged in, but the session could not be saved.", e))?;

    Ok(serde_json::json!({
        "success": true,
        "user": session.display_name(),
        "message": "Logged in successfully!",
    }))
}

pub async fn logout(client: &ApiClient) -> Result<Value, Alert> {
    auth::logout(client).await;
    storage::clear_session()
        .map_err(|e| failure("auth_logout", "Failed to clear the stored session.", e))?;
    Ok(serde_json::json!({ "success": true, "message": "Logged out" }))
}

pub fn whoami(client: &ApiClient) -> Result<Value, Alert> {
    let session = client
        .session()
        .ok_or_else(|| Alert::new("Not logged in", "Please log in first."))?;
    Ok(serde_json::json!({
        "user": session.display_name(),
        "details": session.user,
        "server": client.base_url(),
    }))
}
