//! Bar sources for the executor.
//!
//! Tasks of one instrument share its bars read-only through `Arc<[Bar]>`.
//! `ProcessedSource` reads the processed Parquet store, optionally keeping
//! every loaded series in memory; `InMemorySource` serves bars handed to it
//! directly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use pairlab_core::data::{DataError, ProcessedStore};
use pairlab_core::domain::Bar;

/// Where a task gets its instrument's bars from.
pub trait BarSource: Send + Sync {
    /// Bars for `instrument`, or `DataError::Missing` / `DataError::Empty`.
    fn load(&self, instrument: &str) -> Result<Arc<[Bar]>, DataError>;
}

#[derive(Debug)]
pub struct ProcessedSource {
    store: ProcessedStore,
    cache: Option<Mutex<HashMap<String, Arc<[Bar]>>>>,
}

impl ProcessedSource {
    /// Read the store on every call.
    pub fn new(store: ProcessedStore) -> Self {
        Self { store, cache: None }
    }

    /// Read each instrument once and share the bars afterwards.
    pub fn cached(store: ProcessedStore) -> Self {
        Self {
            store,
            cache: Some(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &ProcessedStore {
        &self.store
    }
}

impl BarSource for ProcessedSource {
    fn load(&self, instrument: &str) -> Result<Arc<[Bar]>, DataError> {
        let Some(cache) = &self.cache else {
            return self.store.load(instrument).map(Arc::from);
        };
        if let Some(bars) = cache.lock().ok().and_then(|c| c.get(instrument).cloned()) {
            return Ok(bars);
        }
        // Loaded outside the lock; two workers may race to load the same
        // instrument and the second insert wins with identical bars.
        let bars: Arc<[Bar]> = Arc::from(self.store.load(instrument)?);
        if let Ok(mut c) = cache.lock() {
            c.insert(instrument.to_string(), Arc::clone(&bars));
        }
        debug!(instrument, bars = bars.len(), "cached instrument bars");
        Ok(bars)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    bars: HashMap<String, Arc<[Bar]>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instrument: impl Into<String>, bars: Vec<Bar>) {
        self.bars.insert(instrument.into(), Arc::from(bars));
    }

    pub fn with(mut self, instrument: impl Into<String>, bars: Vec<Bar>) -> Self {
        self.insert(instrument, bars);
        self
    }
}

impl BarSource for InMemorySource {
    fn load(&self, instrument: &str) -> Result<Arc<[Bar]>, DataError> {
        match self.bars.get(instrument) {
            None => Err(DataError::Missing {
                symbol: instrument.to_string(),
            }),
            Some(bars) if bars.is_empty() => Err(DataError::Empty {
                symbol: instrument.to_string(),
            }),
            Some(bars) => Ok(Arc::clone(bars)),
        }
    }
}
