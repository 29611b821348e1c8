//! File-backed tracing setup for the `dex` binary.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use directories::ProjectDirs;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global subscriber and returns the session id in use.
///
/// Logs always go to `<cache>/logs/<session>/dex.log`; set `DEX_LOG_STDERR`
/// to mirror them on stderr as well.
pub fn setup_logging(session_id: Option<&str>) -> Result<String> {
    let session_id = session_id.map(str::to_string).unwrap_or_else(|| {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        format!("session_{}", timestamp)
    });

    let session_log_dir = log_directory().join(&session_id);
    std::fs::create_dir_all(&session_log_dir)?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "dex.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stderr_layer = std::env::var_os("DEX_LOG_STDERR").map(|_| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    // Keep the writer alive for the rest of the process.
    std::mem::forget(guard);

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::debug!("Log file: {}/dex.log", session_log_dir.display());

    Ok(session_id)
}

fn log_directory() -> PathBuf {
    ProjectDirs::from("", "", "dex")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("dex").join("logs"))
}
