//! Error types recorded by the resolution layer.
//!
//! None of these cross the [`Dex`](crate::Dex) boundary as `Err` values; they
//! are logged and kept as the `last_error` of the component that hit them.

use thiserror::Error;

/// Source-level and worker-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DexError {
    #[error("static documents unavailable: {0}")]
    StaticUnavailable(String),

    #[error("live source unavailable: {0}")]
    LiveUnavailable(String),

    #[error("{0}: no entries in the live or the static source")]
    NoData(&'static str),

    #[error("background job `{job}` panicked: {message}")]
    JobPanicked { job: &'static str, message: String },

    #[error("no worker could be started for `{0}`")]
    WorkerUnavailable(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DexError>;

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
