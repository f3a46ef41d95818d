//! Record store trait.
//!
//! The tracker only ever appends; nothing is read back and no
//! transaction spans more than one record.

use crate::error::{PersistenceError, PersistenceResult};
use parking_lot::Mutex;
use ratewatch_core::{BoxFuture, Record};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Append-only sink for change records.
pub trait RecordStore: Send + Sync {
    /// Persist one record.
    fn store(&self, record: Record) -> BoxFuture<'_, PersistenceResult<()>>;
}

/// Boxed RecordStore trait object owned by one worker.
pub type DynRecordStore = Box<dyn RecordStore>;

/// Builds a store handle for the given pair.
///
/// Called once per worker at startup so every worker owns its handle.
pub type StoreFactory = Arc<dyn Fn(&str) -> PersistenceResult<DynRecordStore> + Send + Sync>;

/// In-memory store for testing.
///
/// Clones share the same buffer and failure switch, so a test can keep
/// one handle for inspection while the worker owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<Record>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write.
    pub fn failing() -> Self {
        let store = Self::new();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Recorded writes, in order.
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Recorded writes for one pair.
    pub fn records_for(&self, pair: &str) -> Vec<Record> {
        self.records
            .lock()
            .iter()
            .filter(|record| record.currency_pair == pair)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    fn append(&self, record: Record) -> PersistenceResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(format!(
                "rejected record for {}",
                record.currency_pair
            )));
        }
        self.records.lock().push(record);
        Ok(())
    }

    /// Factory handing out handles that share this store.
    pub fn factory(&self) -> StoreFactory {
        let store = self.clone();
        Arc::new(move |_pair: &str| -> PersistenceResult<DynRecordStore> {
            Ok(Box::new(store.clone()))
        })
    }
}

impl RecordStore for MemoryStore {
    fn store(&self, record: Record) -> BoxFuture<'_, PersistenceResult<()>> {
        let result = self.append(record);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratewatch_core::{PriceMode, Rate, Settings};
    use std::time::Duration;

    fn record(pair: &str) -> Record {
        let settings = Settings::new(Duration::from_secs(5), 0.01, PriceMode::Both).unwrap();
        Record::initial(pair, Rate::new("100", "100"), &settings)
    }

    #[tokio::test]
    async fn test_memory_store_collects() {
        let store = MemoryStore::new();
        store.store(record("BTC-USD")).await.unwrap();
        store.store(record("ETH-USD")).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.records_for("ETH-USD").len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_failing() {
        let store = MemoryStore::failing();
        let err = store.store(record("BTC-USD")).await.unwrap_err();

        assert!(matches!(err, PersistenceError::Unavailable(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_factory_handles_share_buffer() {
        let store = MemoryStore::new();
        let factory = store.factory();

        let handle = factory("BTC-USD").unwrap();
        handle.store(record("BTC-USD")).await.unwrap();

        assert_eq!(store.len(), 1);
    }
}
