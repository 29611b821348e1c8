//! Lazily loaded key/value data with a live-then-static fallback.
//!
//! A [`DualSourceResolver`] loads at most once per process. The first caller
//! of [`ensure_loaded`](DualSourceResolver::ensure_loaded) or
//! [`spawn_load`](DualSourceResolver::spawn_load) wins the `Unloaded ->
//! Loading` transition and runs the load; every other caller returns at once.
//! The result is published through a [`OnceLock`] before the state flips to
//! `Loaded`, so readers that observe `Loaded` always see the full snapshot.

use std::collections::HashMap;
use std::hash::Hash;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use serde::Serialize;

use crate::error::{DexError, Result, panic_message};
use crate::worker;

const UNLOADED: u8 = 0;
const LOADING: u8 = 1;
const LOADED: u8 = 2;

/// Which source a published snapshot came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceKind {
    Live,
    Static,
    /// Neither source produced entries.
    Empty,
}

/// Lifecycle of a lazily loaded component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
}

impl LoadState {
    fn from_flag(flag: u8) -> Self {
        match flag {
            UNLOADED => Self::Unloaded,
            LOADING => Self::Loading,
            _ => Self::Loaded,
        }
    }
}

/// Produces the full map from one source.
pub type SourceLoader<K, T> = Box<dyn Fn() -> Result<HashMap<K, T>> + Send + Sync>;

struct Snapshot<K, T> {
    data: HashMap<K, T>,
    source: SourceKind,
    error: Option<DexError>,
}

impl<K, T> Snapshot<K, T> {
    fn empty(error: DexError) -> Self {
        Self {
            data: HashMap::new(),
            source: SourceKind::Empty,
            error: Some(error),
        }
    }
}

pub struct DualSourceResolver<K, T> {
    name: &'static str,
    state: AtomicU8,
    snapshot: OnceLock<Snapshot<K, T>>,
    live: SourceLoader<K, T>,
    fallback: SourceLoader<K, T>,
}

impl<K, T> DualSourceResolver<K, T>
where
    K: Eq + Hash + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    /// Creates an unloaded resolver. `live` is tried first; `fallback` only
    /// when the live map is empty or unavailable.
    pub fn new<L, F>(name: &'static str, live: L, fallback: F) -> Self
    where
        L: Fn() -> Result<HashMap<K, T>> + Send + Sync + 'static,
        F: Fn() -> Result<HashMap<K, T>> + Send + Sync + 'static,
    {
        Self {
            name,
            state: AtomicU8::new(UNLOADED),
            snapshot: OnceLock::new(),
            live: Box::new(live),
            fallback: Box::new(fallback),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Loads synchronously unless a load already started.
    ///
    /// A caller that loses the race does not wait for the winner.
    pub fn ensure_loaded(&self) {
        if self.try_claim() {
            self.run_load();
        }
    }

    /// Loads on a background worker unless a load already started.
    pub fn spawn_load(self: &Arc<Self>) {
        if !self.try_claim() {
            return;
        }
        let this = Arc::clone(self);
        if !worker::spawn(self.name, move || this.run_load()) {
            self.run_load();
        }
    }

    fn try_claim(&self) -> bool {
        self.state
            .compare_exchange(UNLOADED, LOADING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn run_load(&self) {
        let snapshot = catch_unwind(AssertUnwindSafe(|| self.load())).unwrap_or_else(|panic| {
            let message = panic_message(panic.as_ref());
            tracing::error!("{} load panicked: {}", self.name, message);
            Snapshot::empty(DexError::JobPanicked {
                job: self.name,
                message,
            })
        });
        // Only the claiming caller reaches this point, so the cell is unset.
        let _ = self.snapshot.set(snapshot);
        self.state.store(LOADED, Ordering::Release);
    }

    fn load(&self) -> Snapshot<K, T> {
        match (self.live)() {
            Ok(data) if !data.is_empty() => {
                tracing::info!(entries = data.len(), "{} resolved from live source", self.name);
                return Snapshot {
                    data,
                    source: SourceKind::Live,
                    error: None,
                };
            }
            Ok(_) => tracing::debug!("{}: live source is empty, using static documents", self.name),
            Err(e) => tracing::debug!("{}: live source unavailable ({}), using static documents", self.name, e),
        }

        match (self.fallback)() {
            Ok(data) if !data.is_empty() => {
                tracing::info!(entries = data.len(), "{} resolved from static documents", self.name);
                Snapshot {
                    data,
                    source: SourceKind::Static,
                    error: None,
                }
            }
            Ok(_) => {
                tracing::warn!("{}: no entries in either source", self.name);
                Snapshot::empty(DexError::NoData(self.name))
            }
            Err(e) => {
                tracing::warn!("{}: {}", self.name, e);
                Snapshot::empty(e)
            }
        }
    }

    fn published(&self) -> Option<&Snapshot<K, T>> {
        if self.state.load(Ordering::Acquire) != LOADED {
            return None;
        }
        self.snapshot.get()
    }

    /// Looks up a key. Never triggers a load.
    pub fn get(&self, key: &K) -> Option<&T> {
        self.published()?.data.get(key)
    }

    /// Every published entry, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (&K, &T)> {
        self.published().into_iter().flat_map(|s| s.data.iter())
    }

    pub fn state(&self) -> LoadState {
        LoadState::from_flag(self.state.load(Ordering::Acquire))
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == LoadState::Loaded
    }

    /// Source of the published snapshot; `None` until loaded.
    pub fn source(&self) -> Option<SourceKind> {
        self.published().map(|s| s.source)
    }

    pub fn last_error(&self) -> Option<&DexError> {
        self.published()?.error.as_ref()
    }

    pub fn len(&self) -> usize {
        self.published().map_or(0, |s| s.data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
