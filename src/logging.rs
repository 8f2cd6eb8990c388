use anyhow::Context;
use chrono::Utc;
use serde_json::Value;
use std::fs;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::filter::{EnvFilter, LevelFilter, Targets};
use tracing_subscriber::{fmt, layer::SubscriberExt, Layer, Registry};

/// Target of the audit events written to the rolling log file
pub const AUDIT_TARGET: &str = "audit";

pub fn setup_logging(log_dir: Option<&str>) -> Result<(), anyhow::Error> {
    // Stdout layer honours RUST_LOG, info by default
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_filter(env_filter);

    // Audit events also go to a daily rotating file when a directory is configured
    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir).context("Failed to create logs directory")?;
            let file_appender = rolling::daily(dir, "audit.log");
            let target_filter = Targets::new().with_target(AUDIT_TARGET, LevelFilter::TRACE);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_filter(target_filter),
            )
        }
        None => None,
    };

    let subscriber = Registry::default().with(stdout_layer).with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global default subscriber")?;

    Ok(())
}

/// Records a state changing request on the audit target
pub fn audit_log(method: &str, path: &str, user_id: i64, body: Option<&Value>) {
    let timestamp = Utc::now().to_rfc3339();

    match body {
        Some(b) => {
            info!(
                target: AUDIT_TARGET,
                method = method,
                uri = path,
                user_id = user_id,
                body = %b,
                "{} {} {} user={} {}", timestamp, method, path, user_id, b
            );
        }
        None => {
            info!(
                target: AUDIT_TARGET,
                method = method,
                uri = path,
                user_id = user_id,
                "{} {} {} user={}", timestamp, method, path, user_id
            );
        }
    }
}
