//! Reference master data: products, processes and workers.
//!
//! Each list lives in its own storage slot and is read-only to the data entry
//! workflow. Records refer to entries by id.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;

/// One lookup entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterEntry {
    /// Identifier referenced by production records.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Any other attributes (unit, department, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MasterEntry {
    /// Create an entry with no extra attributes.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// A product entry.
pub type Product = MasterEntry;
/// A process entry.
pub type Process = MasterEntry;
/// A worker entry.
pub type Worker = MasterEntry;

/// Which master data list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MasterKind {
    /// The `products` slot.
    Products,
    /// The `processes` slot.
    Processes,
    /// The `workers` slot.
    Workers,
}

impl MasterKind {
    /// All kinds, in load order.
    pub const ALL: [Self; 3] = [Self::Products, Self::Processes, Self::Workers];

    /// The storage slot holding this list.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Processes => "processes",
            Self::Workers => "workers",
        }
    }

    /// Check whether `key` is one of the master data slots.
    #[must_use]
    pub fn is_master_key(key: &str) -> bool {
        Self::ALL.iter().any(|kind| kind.key() == key)
    }
}

impl fmt::Display for MasterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Read one master data list.
///
/// Returns `None` if the slot has never been written.
///
/// # Errors
///
/// Returns [`Error::MalformedData`] if the slot is not a JSON array of
/// entries, or a storage error if the store cannot be read.
pub fn load_list<S: KeyValueStore>(store: &S, kind: MasterKind) -> Result<Option<Vec<MasterEntry>>> {
    let Some(raw) = store.get(kind.key())? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| Error::MalformedData {
            key: kind.key().to_string(),
            source,
        })
}

/// Replace one master data list with the JSON array in `raw`.
///
/// The input is parsed first so a bad file never reaches the store. Returns
/// the number of entries written.
///
/// # Errors
///
/// Returns [`Error::MalformedData`] if `raw` is not a JSON array of entries,
/// or a storage error if the write fails.
pub fn import_list<S: KeyValueStore>(store: &mut S, kind: MasterKind, raw: &str) -> Result<usize> {
    let entries: Vec<MasterEntry> =
        serde_json::from_str(raw).map_err(|source| Error::MalformedData {
            key: kind.key().to_string(),
            source,
        })?;
    store.set(kind.key(), &serde_json::to_string(&entries)?)?;
    info!("Imported {} {}", entries.len(), kind);
    Ok(entries.len())
}

/// The three lookup lists used by the data entry form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterData {
    /// Products.
    pub products: Vec<Product>,
    /// Processes.
    pub processes: Vec<Process>,
    /// Workers.
    pub workers: Vec<Worker>,
}

impl MasterData {
    /// Refresh every list from the store.
    ///
    /// Each list is loaded on its own: an absent slot keeps the current list
    /// and an unreadable one is logged and also kept.
    pub fn reload<S: KeyValueStore>(&mut self, store: &S) {
        for kind in MasterKind::ALL {
            match load_list(store, kind) {
                Ok(Some(entries)) => *self.list_mut(kind) = entries,
                Ok(None) => {}
                Err(e) => warn!("Error loading master data: {}", e),
            }
        }
    }

    /// Borrow one list.
    #[must_use]
    pub fn list(&self, kind: MasterKind) -> &[MasterEntry] {
        match kind {
            MasterKind::Products => &self.products,
            MasterKind::Processes => &self.processes,
            MasterKind::Workers => &self.workers,
        }
    }

    fn list_mut(&mut self, kind: MasterKind) -> &mut Vec<MasterEntry> {
        match kind {
            MasterKind::Products => &mut self.products,
            MasterKind::Processes => &mut self.processes,
            MasterKind::Workers => &mut self.workers,
        }
    }

    /// Display name for an id, falling back to the id itself.
    #[must_use]
    pub fn display_name<'a>(&'a self, kind: MasterKind, id: &'a str) -> &'a str {
        self.list(kind)
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(id)
    }
}
