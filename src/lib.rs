//! Sunrack RCC Kit sales client.
//!
//! Talks to the RCC Kit portal backend to raise sales orders, track their
//! production and dispatch status, reconcile kit shipments against what was
//! ordered, and manage percentage dispatch lots and order documents. The
//! screen actions live in [`commands`]; the `rcc-kit` binary exposes them as
//! subcommands through [`cli`].

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
mod data_helpers;
pub mod diagnostics;
pub mod dispatch;
pub mod documents;
pub mod enquiry;
pub mod error;
pub mod kits;
pub mod models;
pub mod orders;
pub mod session;
pub mod storage;
#[cfg(test)]
mod test_support;

use api::ApiClient;
use cli::{Cli, Command};
use config::AppConfig;

const DEFAULT_LOG_FILTER: &str = "warn,rcc_kit_sales_lib=info";

/// Structured logging to stderr and a daily rolling file. The returned guard
/// flushes the file writer when dropped.
fn init_logging() -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    diagnostics::prune_old_logs();

    let log_dir = diagnostics::get_log_dir();
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();
        warn!(dir = %log_dir.display(), error = %e, "file logging disabled");
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, diagnostics::LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();
    Some(guard)
}

/// Entry point for the `rcc-kit` binary. Payloads go to stdout as JSON;
/// alerts go to stderr and make the process exit non-zero.
pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _log_guard = init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "rcc-kit starting");

    let config = AppConfig::resolve(cli.api_base_url.as_deref(), cli.timeout_secs)?;

    // A fresh login must not send a stale token.
    let session = match cli.command {
        Command::Login { .. } | Command::About => None,
        _ => storage::load_session(),
    };
    let client = ApiClient::new(&config, session)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let outcome = runtime.block_on(cli::execute(cli.command, &config, &client));

    match outcome {
        Ok(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(alert) => {
            eprintln!("{alert}");
            Ok(ExitCode::FAILURE)
        }
    }
}
