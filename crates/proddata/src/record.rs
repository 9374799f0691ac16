//! Core record types for proddata.
//!
//! A [`ProductionRecord`] describes one manufacturing event: which product
//! went through which process, who did the work, when, and how much came out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Number of hex digits of the content digest appended to generated ids.
const ID_DIGEST_LEN: usize = 8;

/// One production data entry.
///
/// Serialized with camelCase keys so the stored JSON matches what the data
/// entry form has always written. Keys this type does not know about are kept
/// in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRecord {
    /// Identifier, unique within the collection by convention only.
    pub id: String,

    /// Product reference (a product id, or a free-text product name).
    pub product_id: String,

    /// Process reference.
    pub process_id: String,

    /// Worker reference.
    pub worker_id: String,

    /// When the work happened, as an ISO-like date or date-time string.
    pub date: String,

    /// Number of good units produced.
    #[serde(default)]
    pub quantity: u32,

    /// Number of defective units.
    #[serde(default)]
    pub defect_count: u32,

    /// Hours spent.
    #[serde(default)]
    pub work_hours: f64,

    /// Free-form remarks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Fields written by other tools, preserved on read-modify-write.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductionRecord {
    /// Create a record with a freshly generated id.
    #[must_use]
    pub fn new(
        product_id: impl Into<String>,
        process_id: impl Into<String>,
        worker_id: impl Into<String>,
        date: impl Into<String>,
        quantity: u32,
    ) -> Self {
        let mut record = Self::with_id(String::new(), product_id, process_id, worker_id, date);
        record.quantity = quantity;
        record.id = record.generate_id(Utc::now());
        record
    }

    /// Create a record with a caller-chosen id and zeroed metrics.
    #[must_use]
    pub fn with_id(
        id: impl Into<String>,
        product_id: impl Into<String>,
        process_id: impl Into<String>,
        worker_id: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            product_id: product_id.into(),
            process_id: process_id.into(),
            worker_id: worker_id.into(),
            date: date.into(),
            quantity: 0,
            defect_count: 0,
            work_hours: 0.0,
            notes: None,
            extra: Map::new(),
        }
    }

    /// Derive an id of the form `<unix millis>-<digest>` from the record
    /// contents and the given instant.
    #[must_use]
    pub fn generate_id(&self, at: DateTime<Utc>) -> String {
        let millis = at.timestamp_millis();
        let material = format!(
            "{millis}|{}|{}|{}|{}|{}",
            self.product_id, self.process_id, self.worker_id, self.date, self.quantity
        );
        let digest = blake3::hash(material.as_bytes()).to_hex();
        format!("{millis}-{}", &digest[..ID_DIGEST_LEN])
    }

    /// Check whether the product reference contains `needle`, ignoring case.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn product_matches(&self, needle: &str) -> bool {
        self.product_id.to_lowercase().contains(needle)
    }

    /// Check that the record can be stored and read back.
    ///
    /// JSON has no encoding for NaN or infinity, so a non-finite
    /// `work_hours` would be written as `null` and break the whole collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `work_hours` is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if !self.work_hours.is_finite() || self.work_hours < 0.0 {
            return Err(Error::invalid_input(format!(
                "workHours must be a non-negative number, got {}",
                self.work_hours
            )));
        }
        Ok(())
    }

    /// Total units handled, good and defective.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        u64::from(self.quantity) + u64::from(self.defect_count)
    }
}
