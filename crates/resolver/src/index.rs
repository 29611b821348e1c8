//! Inverted indices: attribute -> entities carrying it.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use dex_core::IndexEntry;

use crate::error::{DexError, panic_message};
use crate::worker;

const IDLE: u8 = 0;
const BUILDING: u8 = 1;
const READY: u8 = 2;

/// Immutable attribute -> contributions map.
///
/// Each list holds at most one entry per identity and is ordered by
/// `(ordinal, entity_id, identity)`.
#[derive(Clone, Debug)]
pub struct ReverseIndex<K, V> {
    entries: HashMap<K, Vec<V>>,
}

impl<K, V> Default for ReverseIndex<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V: IndexEntry> ReverseIndex<K, V> {
    /// Builds an index from per-entity extractions.
    ///
    /// An entity whose extraction fails or panics is logged and skipped;
    /// contributions of every other entity are kept.
    pub fn build<E, I, F, Err>(entities: I, extract: F) -> Self
    where
        I: IntoIterator<Item = E>,
        F: Fn(&E) -> Result<Vec<(K, V)>, Err>,
        Err: Display,
    {
        let mut entries: HashMap<K, Vec<V>> = HashMap::new();
        let mut skipped = 0usize;

        for (position, entity) in entities.into_iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| extract(&entity))) {
                Ok(Ok(pairs)) => {
                    for (key, value) in pairs {
                        entries.entry(key).or_default().push(value);
                    }
                }
                Ok(Err(e)) => {
                    skipped += 1;
                    tracing::debug!("Skipping entity #{} during index build: {}", position, e);
                }
                Err(panic) => {
                    skipped += 1;
                    tracing::warn!(
                        "Entity #{} panicked during index build: {}",
                        position,
                        panic_message(panic.as_ref())
                    );
                }
            }
        }

        for list in entries.values_mut() {
            dedupe_and_sort(list);
        }
        if skipped > 0 {
            tracing::debug!(skipped, "Index built with skipped entities");
        }
        Self { entries }
    }

    /// Contributions for a key; empty when the key is unknown.
    pub fn get(&self, key: &K) -> &[V] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Number of indexed keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn dedupe_and_sort<V: IndexEntry>(list: &mut Vec<V>) {
    let mut seen = HashSet::new();
    list.retain(|entry| seen.insert(entry.identity()));
    list.sort_by_cached_key(|entry| (entry.ordinal(), entry.entity_id().to_string(), entry.identity()));
}

/// A reverse index built once on a background worker.
///
/// [`get`](Self::get) returns an empty slice until the index is published.
pub struct ReverseIndexBuilder<K, V> {
    name: &'static str,
    state: AtomicU8,
    index: OnceLock<ReverseIndex<K, V>>,
    error: OnceLock<DexError>,
}

impl<K, V> ReverseIndexBuilder<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: IndexEntry,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: AtomicU8::new(IDLE),
            index: OnceLock::new(),
            error: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Starts the build in the background. No-op if a build already started.
    ///
    /// `entities` is called on the worker, so collecting the entity set does
    /// not block the caller either.
    pub fn trigger<E, G, F, Err>(self: &Arc<Self>, entities: G, extract: F)
    where
        E: 'static,
        G: FnOnce() -> Vec<E> + Send + 'static,
        F: Fn(&E) -> Result<Vec<(K, V)>, Err> + Send + 'static,
        Err: Display,
    {
        self.trigger_with_fallback(entities, Vec::new, extract);
    }

    /// Like [`trigger`](Self::trigger), but builds from `fallback` when the
    /// `primary` entities contribute nothing.
    pub fn trigger_with_fallback<E, G, H, F, Err>(self: &Arc<Self>, primary: G, fallback: H, extract: F)
    where
        E: 'static,
        G: FnOnce() -> Vec<E> + Send + 'static,
        H: FnOnce() -> Vec<E> + Send + 'static,
        F: Fn(&E) -> Result<Vec<(K, V)>, Err> + Send + 'static,
        Err: Display,
    {
        if !self.try_claim() {
            return;
        }

        let this = Arc::clone(self);
        if !worker::spawn(self.name, move || this.run(primary, fallback, extract)) {
            let _ = self.error.set(DexError::WorkerUnavailable(self.name));
            let _ = self.index.set(ReverseIndex::default());
            self.state.store(READY, Ordering::Release);
        }
    }

    /// Builds synchronously. No-op if a build already started.
    pub fn build_now<E, I, F, Err>(&self, entities: I, extract: F)
    where
        I: IntoIterator<Item = E>,
        F: Fn(&E) -> Result<Vec<(K, V)>, Err>,
        Err: Display,
    {
        if self.try_claim() {
            self.run(move || entities, Vec::new, extract);
        }
    }

    fn try_claim(&self) -> bool {
        self.state
            .compare_exchange(IDLE, BUILDING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn run<E, I, J, G, H, F, Err>(&self, primary: G, fallback: H, extract: F)
    where
        I: IntoIterator<Item = E>,
        J: IntoIterator<Item = E>,
        G: FnOnce() -> I,
        H: FnOnce() -> J,
        F: Fn(&E) -> Result<Vec<(K, V)>, Err>,
        Err: Display,
    {
        let built = catch_unwind(AssertUnwindSafe(|| {
            let index = ReverseIndex::build(primary(), &extract);
            if !index.is_empty() {
                return index;
            }
            tracing::debug!("{}: primary entities contributed nothing, using fallback", self.name);
            ReverseIndex::build(fallback(), &extract)
        }));
        let index = match built {
            Ok(index) => {
                tracing::info!(keys = index.len(), "{} index ready", self.name);
                index
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!("{} index build panicked: {}", self.name, message);
                let _ = self.error.set(DexError::JobPanicked {
                    job: self.name,
                    message,
                });
                ReverseIndex::default()
            }
        };
        let _ = self.index.set(index);
        self.state.store(READY, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.state.load(Ordering::Acquire) == READY
    }

    fn published(&self) -> Option<&ReverseIndex<K, V>> {
        if !self.is_ready() {
            return None;
        }
        self.index.get()
    }

    /// Contributions for a key; empty before the index is ready.
    pub fn get(&self, key: &K) -> &[V] {
        self.published()
            .map(|index| index.get(key))
            .unwrap_or_default()
    }

    /// Indexed keys; empty before the index is ready.
    pub fn keys(&self) -> Vec<&K> {
        self.published()
            .map(|index| index.keys().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.published().map_or(0, ReverseIndex::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_error(&self) -> Option<&DexError> {
        self.error.get()
    }
}
