//! `proddata` - Record and review manufacturing production data
//!
//! This library provides the production data store, the repository that
//! queries it, and the controller behind the data entry page. Records are
//! kept as one JSON collection in a key-value store, alongside the master
//! data (products, processes, workers) used to label them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod controller;
pub mod dates;
pub mod error;
pub mod export;
pub mod logging;
pub mod master;
pub mod record;
pub mod repository;
pub mod storage;

pub use config::Config;
pub use controller::DataEntryController;
pub use dates::DateRange;
pub use error::{Error, Result};
pub use export::{CsvExporter, Exporter};
pub use logging::init_logging;
pub use master::{MasterData, MasterKind};
pub use record::ProductionRecord;
pub use repository::ProductionRepository;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StorageStats};
