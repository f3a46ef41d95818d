//! Core domain types for ratewatch.
//!
//! This crate provides the types shared by every tracker component:
//! - `Rate`: one ask/bid observation for a currency pair
//! - `Settings`, `PriceMode`: tracker configuration, read-only after startup
//! - `Diff`, `Record`, `Trigger`: change events handed to persistence

pub mod error;
pub mod rate;
pub mod record;
pub mod settings;

use std::future::Future;
use std::pin::Pin;

pub use error::{CoreError, Result};
pub use rate::{PriceSide, Rate};
pub use record::{Diff, Record, SettingsSnapshot, Trigger};
pub use settings::{PriceMode, Settings};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
