//! JSON Lines record store.
//!
//! Uses JSON Lines format (.jsonl):
//! - Each line is a complete JSON record
//! - Files are opened in append mode, one file per UTC day
//! - Every record is flushed as soon as it is written, so a failed
//!   write is reported for exactly the record that caused it

use crate::error::PersistenceResult;
use crate::store::{DynRecordStore, RecordStore, StoreFactory};
use parking_lot::Mutex;
use ratewatch_core::{BoxFuture, Record};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Active writer state for daily file.
struct ActiveWriter {
    writer: BufWriter<File>,
    date: String,
    records_written: usize,
}

struct WriterState {
    base_dir: PathBuf,
    active: Option<ActiveWriter>,
}

impl WriterState {
    /// Writer for `date`, rotating away from a previous day's file.
    fn writer_for(&mut self, date: &str) -> PersistenceResult<&mut ActiveWriter> {
        let active = match self.active.take() {
            Some(active) if active.date == date => active,
            previous => {
                if let Some(previous) = previous {
                    close_writer(previous);
                }
                self.open(date)?
            }
        };

        Ok(self.active.insert(active))
    }

    fn open(&self, date: &str) -> PersistenceResult<ActiveWriter> {
        let path = file_path(&self.base_dir, date);

        info!(path = %path.display(), "Opening JSON Lines store (append mode)");

        // Append mode - never truncates existing data
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(ActiveWriter {
            writer: BufWriter::new(file),
            date: date.to_string(),
            records_written: 0,
        })
    }

    fn close(&mut self) {
        if let Some(active) = self.active.take() {
            close_writer(active);
        }
    }
}

fn close_writer(mut active: ActiveWriter) {
    if let Err(e) = active.writer.flush() {
        warn!(?e, "Failed to flush writer on close");
    }
    info!(
        date = %active.date,
        records = active.records_written,
        "Closed JSON Lines store"
    );
}

fn file_path(base_dir: &Path, date: &str) -> PathBuf {
    base_dir.join(format!("records_{date}.jsonl"))
}

/// Append-only JSON Lines store.
///
/// Cheap to clone: clones are handles onto the same file, and writes from
/// all handles are serialized so lines never interleave.
#[derive(Clone)]
pub struct JsonLinesStore {
    state: Arc<Mutex<WriterState>>,
}

impl JsonLinesStore {
    /// Create a store writing under `base_dir`, creating the directory.
    pub fn new(base_dir: impl AsRef<Path>) -> PersistenceResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;

        Ok(Self {
            state: Arc::new(Mutex::new(WriterState {
                base_dir,
                active: None,
            })),
        })
    }

    /// Path of the file that records stamped on `date` (YYYY-MM-DD) go to.
    pub fn path_for(&self, date: &str) -> PathBuf {
        file_path(&self.state.lock().base_dir, date)
    }

    /// Append one record and flush it.
    pub fn append(&self, record: &Record) -> PersistenceResult<()> {
        let line = serde_json::to_string(record)?;
        let date = record.timestamp.format("%Y-%m-%d").to_string();

        let mut state = self.state.lock();
        let active = state.writer_for(&date)?;

        writeln!(active.writer, "{line}")?;
        active.writer.flush()?;
        active.records_written += 1;

        debug!(
            pair = %record.currency_pair,
            trigger = record.trigger().as_str(),
            "Record appended"
        );

        Ok(())
    }

    /// Flush and close the current file. A later append reopens it.
    pub fn close(&self) {
        self.state.lock().close();
    }

    /// Factory handing every worker a handle onto this store.
    pub fn factory(&self) -> StoreFactory {
        let store = self.clone();
        Arc::new(move |pair: &str| -> PersistenceResult<DynRecordStore> {
            debug!(pair, "Issuing JSON Lines store handle");
            Ok(Box::new(store.clone()))
        })
    }
}

impl RecordStore for JsonLinesStore {
    fn store(&self, record: Record) -> BoxFuture<'_, PersistenceResult<()>> {
        let result = self.append(&record);
        Box::pin(async move { result })
    }
}

impl Drop for WriterState {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for JsonLinesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("JsonLinesStore")
            .field("base_dir", &state.base_dir)
            .field("open_date", &state.active.as_ref().map(|a| a.date.clone()))
            .finish()
    }
}
