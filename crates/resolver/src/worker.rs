//! Background job launcher.
//!
//! Jobs run on Tokio's blocking pool when called from inside a runtime and on
//! a dedicated named thread otherwise, so the layer works the same for async
//! and plain embedders.

use tokio::runtime::Handle;

/// Starts `job` in the background.
///
/// Returns `false` when no worker could be started; the job has then been
/// dropped and the caller should run the work inline.
pub(crate) fn spawn<F>(name: &'static str, job: F) -> bool
where
    F: FnOnce() + Send + 'static,
{
    if let Ok(handle) = Handle::try_current() {
        tracing::debug!("Starting {} on the blocking pool", name);
        drop(handle.spawn_blocking(job));
        return true;
    }

    match std::thread::Builder::new()
        .name(format!("dex-{name}"))
        .spawn(job)
    {
        Ok(_) => {
            tracing::debug!("Started {} worker thread", name);
            true
        }
        Err(e) => {
            tracing::warn!("Failed to start {} worker thread: {}", name, e);
            false
        }
    }
}
