//! Record persistence for ratewatch.
//!
//! Change records are appended to JSON Lines files, one object per line,
//! so an interrupted write only loses that line.

pub mod error;
pub mod store;
pub mod writer;

pub use error::{PersistenceError, PersistenceResult};
pub use store::{DynRecordStore, MemoryStore, RecordStore, StoreFactory};
pub use writer::JsonLinesStore;
