//! The static document library, parsed once and shared.

use std::sync::{Arc, OnceLock};

use dex_content::{DocumentSource, StaticLibrary};

use crate::error::{DexError, Result};

/// Parses the static documents on first use.
///
/// Every resolver, index and the evolution graph read the same parsed
/// library; the scan runs once no matter how many of them ask for it.
pub struct SharedLibrary {
    source: Option<Arc<dyn DocumentSource>>,
    cell: OnceLock<Arc<StaticLibrary>>,
    error: OnceLock<DexError>,
}

impl SharedLibrary {
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self {
            source: Some(source),
            cell: OnceLock::new(),
            error: OnceLock::new(),
        }
    }

    /// Wraps an already parsed library.
    pub fn preloaded(library: StaticLibrary) -> Self {
        Self {
            source: None,
            cell: OnceLock::from(Arc::new(library)),
            error: OnceLock::new(),
        }
    }

    /// The library; empty when the documents could not be scanned.
    pub fn get(&self) -> Arc<StaticLibrary> {
        Arc::clone(self.cell.get_or_init(|| self.load()))
    }

    /// The library, or the reason it is unavailable.
    pub fn require(&self) -> Result<Arc<StaticLibrary>> {
        let library = self.get();
        match self.error.get() {
            Some(e) => Err(e.clone()),
            None => Ok(library),
        }
    }

    fn load(&self) -> Arc<StaticLibrary> {
        let Some(source) = &self.source else {
            return Arc::new(StaticLibrary::default());
        };
        match StaticLibrary::load(source.as_ref()) {
            Ok(library) => Arc::new(library),
            Err(e) => {
                tracing::warn!("Static library unavailable: {:#}", e);
                let _ = self.error.set(DexError::StaticUnavailable(format!("{e:#}")));
                Arc::new(StaticLibrary::default())
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn last_error(&self) -> Option<&DexError> {
        self.error.get()
    }
}
