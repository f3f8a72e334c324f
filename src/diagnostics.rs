//! Diagnostics for the RCC Kit sales client.
//!
//! Provides:
//! - **About info**: version, build timestamp, git SHA, platform, API server
//! - **Log rotation helpers**: used by `lib.rs` to configure rolling log files.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::AppConfig;

/// Maximum number of log files to retain.
pub const MAX_LOG_FILES: usize = 10;

/// Rolling file prefix; the appender adds the date.
pub const LOG_FILE_PREFIX: &str = "rcc-kit";

const APP_DIR: &str = "rcc-kit-sales";

// ---------------------------------------------------------------------------
// About info
// ---------------------------------------------------------------------------

/// Returns version, build timestamp, git SHA, platform info and the server
/// this build talks to.
pub fn get_about_info(config: &AppConfig) -> Value {
    json!({
        "version": env!("CARGO_PKG_VERSION"),
        "buildTimestamp": env!("BUILD_TIMESTAMP"),
        "gitSha": env!("BUILD_GIT_SHA"),
        "platform": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
        "apiBaseUrl": config.api_base_url,
        "timeoutSecs": config.timeout.as_secs(),
        "logDir": get_log_dir().display().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Log rotation
// ---------------------------------------------------------------------------

/// Returns the log directory path (same location used by lib.rs).
pub fn get_log_dir() -> PathBuf {
    let base = std::env::var("LOCALAPPDATA")
        .or_else(|_| std::env::var("XDG_DATA_HOME"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(target_os = "windows")]
            {
                PathBuf::from(std::env::var("USERPROFILE").unwrap_or_else(|_| ".".into()))
                    .join("AppData")
                    .join("Local")
            }
            #[cfg(not(target_os = "windows"))]
            {
                PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()))
                    .join(".local")
                    .join("share")
            }
        });
    base.join(APP_DIR).join("logs")
}

/// Prune old log files, keeping only the most recent `MAX_LOG_FILES`.
pub fn prune_old_logs() {
    prune_logs_in(&get_log_dir(), MAX_LOG_FILES);
}

fn is_log_file(name: &str) -> bool {
    name == format!("{LOG_FILE_PREFIX}.log") || name.starts_with(&format!("{LOG_FILE_PREFIX}."))
}

pub(crate) fn prune_logs_in(log_dir: &Path, keep: usize) {
    if !log_dir.exists() {
        return;
    }

    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();
    if let Ok(entries) = fs::read_dir(log_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.file_name().and_then(|n| n.to_str()).is_some_and(is_log_file) {
                let modified = entry
                    .metadata()
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .unwrap_or(std::time::UNIX_EPOCH);
                log_files.push((path, modified));
            }
        }
    }

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in log_files.iter().skip(keep) {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "failed to prune log file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_about_info_has_required_fields() {
        let info = get_about_info(&AppConfig::default());
        assert!(info.get("version").is_some());
        assert!(info.get("buildTimestamp").is_some());
        assert!(info.get("gitSha").is_some());
        assert!(info.get("platform").is_some());
        assert_eq!(info["timeoutSecs"], 30);
    }

    #[test]
    fn test_log_dir_is_stable() {
        let d1 = get_log_dir();
        let d2 = get_log_dir();
        assert_eq!(d1, d2);
        assert!(d1.ends_with("rcc-kit-sales/logs"));
    }

    #[test]
    fn test_prune_keeps_newest_and_ignores_other_files() {
        let dir = std::env::temp_dir().join(format!("rcc-kit-prune-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create temp log dir");

        let base = SystemTime::now() - Duration::from_secs(3600);
        for day in 1..=4 {
            let path = dir.join(format!("rcc-kit.2024-05-0{day}"));
            let file = fs::File::create(&path).expect("create log");
            file.set_modified(base + Duration::from_secs(day * 60))
                .expect("set mtime");
        }
        fs::write(dir.join("notes.txt"), "keep me").expect("write other file");

        prune_logs_in(&dir, 2);

        let mut left: Vec<String> = fs::read_dir(&dir)
            .expect("read dir")
            .flatten()
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        left.sort();
        assert_eq!(left, vec!["notes.txt", "rcc-kit.2024-05-03", "rcc-kit.2024-05-04"]);

        let _ = fs::remove_dir_all(&dir);
    }
}
