//! Session persistence in the OS credential store.
//!
//! On Windows this uses the Credential Manager (via the `keyring` crate), on
//! macOS Keychain, and on Linux the kernel keyutils store. The session is kept
//! as a single JSON entry so the access and refresh tokens stay together.

use keyring::Entry;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::session::Session;

const SERVICE_NAME: &str = "rcc-kit-sales";

const KEY_SESSION: &str = "session";

// ---------------------------------------------------------------------------
// Low-level helpers
// ---------------------------------------------------------------------------

/// Retrieve a single credential from the OS keyring. Returns `None` when the
/// entry does not exist (or the platform returns a "not found" error).
pub fn get_credential(key: &str) -> Option<String> {
    let entry = match Entry::new(SERVICE_NAME, key) {
        Ok(e) => e,
        Err(e) => {
            warn!(key, error = %e, "keyring: failed to create entry");
            return None;
        }
    };
    match entry.get_password() {
        Ok(pw) => Some(pw),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!(key, error = %e, "keyring: failed to read credential");
            None
        }
    }
}

/// Store a credential in the OS keyring.
pub fn set_credential(key: &str, value: &str) -> AppResult<()> {
    let entry = Entry::new(SERVICE_NAME, key)?;
    entry.set_password(value)?;
    Ok(())
}

/// Delete a credential from the OS keyring. Silently succeeds if the entry
/// does not exist.
pub fn delete_credential(key: &str) -> AppResult<()> {
    let entry = Entry::new(SERVICE_NAME, key)?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The stored session, if any. A corrupt entry is treated as logged out.
pub fn load_session() -> Option<Session> {
    let raw = get_credential(KEY_SESSION)?;
    match serde_json::from_str::<Session>(&raw) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!(error = %e, "stored session is unreadable, ignoring it");
            None
        }
    }
}

pub fn save_session(session: &Session) -> AppResult<()> {
    let raw = serde_json::to_string(session)?;
    set_credential(KEY_SESSION, &raw)?;
    info!(user = %session.display_name(), "session stored");
    Ok(())
}

pub fn clear_session() -> AppResult<()> {
    delete_credential(KEY_SESSION)?;
    info!("session cleared");
    Ok(())
}
