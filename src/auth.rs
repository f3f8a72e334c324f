//! Username/password login against the sales backend.
//!
//! A successful login produces a [`Session`]; persisting it is the caller's
//! job (see `commands::auth`). Logout is best-effort on the server side and
//! always succeeds locally.

use tracing::{info, warn};
use zeroize::Zeroize;

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::session::Session;

/// Log in with `username` / `password`. The password buffer is wiped before
/// returning, whatever the outcome.
pub async fn login(config: &AppConfig, username: &str, mut password: String) -> AppResult<Session> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        password.zeroize();
        return Err(AppError::validation("Please enter username and password"));
    }

    let client = ApiClient::new(config, None)?;
    let result = client.login(username, &password).await;
    password.zeroize();

    let body = result?;
    let session = Session::from_login_response(&body)?;
    info!(user = %session.display_name(), "login succeeded");
    Ok(session)
}

/// Tell the backend the session is over. Failures are logged, not returned:
/// the local session is dropped regardless.
pub async fn logout(client: &ApiClient) {
    if client.session().is_none() {
        return;
    }
    if let Err(e) = client.logout().await {
        warn!(error = %e, "logout request failed, continuing with local logout");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_backend, MockBackend};
    use std::time::Duration;

    fn config(base: String) -> AppConfig {
        AppConfig {
            api_base_url: base,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn login_returns_session_with_tokens() {
        let backend = MockBackend::default();
        backend.add_user("sales1", "secret");
        let cfg = config(spawn_backend(backend).await);

        let session = login(&cfg, " sales1 ", "secret".to_string())
            .await
            .expect("valid credentials");
        assert_eq!(session.bearer(), Some("tok-sales1"));
        assert_eq!(session.display_name(), "sales1");
    }

    #[tokio::test]
    async fn login_rejects_bad_password_with_server_message() {
        let backend = MockBackend::default();
        backend.add_user("sales1", "secret");
        let cfg = config(spawn_backend(backend).await);

        let err = login(&cfg, "sales1", "wrong".to_string())
            .await
            .expect_err("bad password");
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn empty_credentials_never_reach_the_server() {
        let backend = MockBackend::default();
        let cfg = config(spawn_backend(backend.clone()).await);

        let err = login(&cfg, "  ", "secret".to_string())
            .await
            .expect_err("blank username");
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(backend.requests(), 0);
    }
}
