//! Production data repository.
//!
//! The whole collection lives in one storage slot as a JSON array. Every
//! mutation reads the full array, changes a copy and writes the full array
//! back, so the slot is only consistent with a single writer.

use tracing::{debug, info, warn};

use crate::dates::DateRange;
use crate::error::{Error, Result};
use crate::record::ProductionRecord;
use crate::storage::KeyValueStore;

/// Default storage slot for the production data collection.
pub const DEFAULT_COLLECTION_KEY: &str = "productionData";

/// CRUD and filtering over the production data collection.
#[derive(Debug)]
pub struct ProductionRepository<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> ProductionRepository<S> {
    /// Create a repository over the default collection slot.
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_COLLECTION_KEY)
    }

    /// Create a repository over a custom collection slot.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The slot holding the collection.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the repository and return the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Read the whole collection, in insertion order.
    ///
    /// An absent slot is an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedData`] if the slot does not hold a JSON array
    /// of records, or a storage error if the store cannot be read.
    pub fn get_all(&self) -> Result<Vec<ProductionRecord>> {
        let Some(raw) = self.store.get(&self.key).map_err(|e| {
            warn!("Error reading production data: {}", e);
            e
        })?
        else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw).map_err(|source| {
            warn!("Error parsing production data in '{}': {}", self.key, source);
            Error::MalformedData {
                key: self.key.clone(),
                source,
            }
        })
    }

    /// Overwrite the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the store refuses the write.
    pub fn save_all(&mut self, records: &[ProductionRecord]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.store.set(&self.key, &raw).map_err(|e| {
            warn!("Error saving production data: {}", e);
            e
        })?;
        debug!("Saved {} records to '{}'", records.len(), self.key);
        Ok(())
    }

    /// Find the first record with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn get(&self, id: &str) -> Result<Option<ProductionRecord>> {
        Ok(self.get_all()?.into_iter().find(|r| r.id == id))
    }

    /// Append a record to the end of the collection.
    ///
    /// Duplicate ids are not checked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] without writing if the record fails
    /// [`ProductionRecord::validate`], or an error if the collection cannot be
    /// read or written.
    pub fn add(&mut self, record: ProductionRecord) -> Result<()> {
        record.validate()?;
        let mut records = self.get_all()?;
        let id = record.id.clone();
        records.push(record);
        self.save_all(&records)?;
        info!("Added production record {}", id);
        Ok(())
    }

    /// Replace the first record whose id matches, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] or [`Error::RecordNotFound`] without
    /// writing, or an error if the collection cannot be read or written.
    pub fn update(&mut self, record: ProductionRecord) -> Result<()> {
        record.validate()?;
        let mut records = self.get_all()?;
        let Some(slot) = records.iter_mut().find(|r| r.id == record.id) else {
            debug!("No production record {} to update", record.id);
            return Err(Error::not_found(record.id));
        };
        let id = record.id.clone();
        *slot = record;
        self.save_all(&records)?;
        info!("Updated production record {}", id);
        Ok(())
    }

    /// Remove every record with the given id.
    ///
    /// The collection is written back even when nothing matched. Returns how
    /// many records were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read or written.
    pub fn delete(&mut self, id: &str) -> Result<usize> {
        let mut records = self.get_all()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        let removed = before - records.len();
        self.save_all(&records)?;
        info!("Deleted {} production record(s) with id {}", removed, id);
        Ok(removed)
    }

    /// Records whose date falls within `[start, end of day(end)]`.
    ///
    /// Blank or missing bounds leave that side open; with no bounds at all
    /// the full collection is returned in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDate`] if a bound cannot be parsed, or an error
    /// if the collection cannot be read.
    pub fn filter_by_date_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<ProductionRecord>> {
        let range = DateRange::parse(start, end).map_err(|e| {
            warn!("Error filtering by date range: {}", e);
            e
        })?;
        self.filter_by(&range)
    }

    /// Records within an already parsed range.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn filter_by(&self, range: &DateRange) -> Result<Vec<ProductionRecord>> {
        let mut records = self.get_all()?;
        records.retain(|r| range.contains(&r.date));
        Ok(records)
    }

    /// Records whose product reference contains `term`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn filter_by_product_name(&self, term: &str) -> Result<Vec<ProductionRecord>> {
        let needle = term.to_lowercase();
        let mut records = self.get_all()?;
        records.retain(|r| r.product_matches(&needle));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SqliteStore};

    fn record(id: &str, product: &str, date: &str) -> ProductionRecord {
        ProductionRecord::with_id(id, product, "assembly", "w-01", date)
    }

    fn ids(records: &[ProductionRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    fn create_test_repo() -> ProductionRepository<MemoryStore> {
        ProductionRepository::new(MemoryStore::new())
    }

    fn seeded_repo() -> ProductionRepository<MemoryStore> {
        let mut repo = create_test_repo();
        repo.add(record("1", "Widget-A", "2024-03-01")).unwrap();
        repo.add(record("2", "Gadget", "2024-03-02T14:00")).unwrap();
        repo.add(record("3", "widget-b", "2024-03-05")).unwrap();
        repo
    }

    #[test]
    fn test_get_all_absent_slot_is_empty() {
        let repo = create_test_repo();
        assert!(repo.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_get_all_malformed_slot() {
        let mut store = MemoryStore::new();
        store.set(DEFAULT_COLLECTION_KEY, "{not json").unwrap();
        let repo = ProductionRepository::new(store);

        let err = repo.get_all().unwrap_err();
        assert!(err.is_malformed_data());
    }

    #[test]
    fn test_add_appends_at_end() {
        let mut repo = seeded_repo();
        repo.add(record("4", "Bolt", "2024-03-06")).unwrap();

        let all = repo.get_all().unwrap();
        assert_eq!(ids(&all), vec!["1", "2", "3", "4"]);
        assert_eq!(all.iter().filter(|r| r.id == "4").count(), 1);
    }

    #[test]
    fn test_add_does_not_check_duplicates() {
        let mut repo = seeded_repo();
        repo.add(record("1", "Again", "2024-03-07")).unwrap();

        let all = repo.get_all().unwrap();
        assert_eq!(ids(&all), vec!["1", "2", "3", "1"]);
    }

    #[test]
    fn test_add_fails_when_quota_exceeded() {
        let mut repo = ProductionRepository::new(MemoryStore::with_quota(64));
        let err = repo
            .add(record("1", "a very long product name", "2024-03-01"))
            .unwrap_err();

        assert!(err.is_storage_error());
        assert!(repo.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_add_rejects_non_finite_hours_and_keeps_slot_readable() {
        let mut repo = seeded_repo();
        let before = repo.store().get(DEFAULT_COLLECTION_KEY).unwrap();

        let mut bad = record("4", "Bolt", "2024-03-06");
        bad.work_hours = f64::NAN;
        let err = repo.add(bad).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));

        assert_eq!(repo.store().get(DEFAULT_COLLECTION_KEY).unwrap(), before);
        assert_eq!(ids(&repo.get_all().unwrap()), vec!["1", "2", "3"]);
        repo.add(record("5", "Nut", "2024-03-07")).unwrap();
    }

    #[test]
    fn test_update_rejects_negative_or_infinite_hours() {
        let mut repo = seeded_repo();
        let before = repo.store().get(DEFAULT_COLLECTION_KEY).unwrap();

        for hours in [-1.0, f64::INFINITY] {
            let mut bad = record("2", "Gadget", "2024-03-02");
            bad.work_hours = hours;
            assert!(matches!(
                repo.update(bad).unwrap_err(),
                Error::InvalidInput { .. }
            ));
        }
        assert_eq!(repo.store().get(DEFAULT_COLLECTION_KEY).unwrap(), before);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut repo = seeded_repo();
        let mut changed = record("2", "Gadget-XL", "2024-03-02");
        changed.quantity = 99;
        repo.update(changed).unwrap();

        let all = repo.get_all().unwrap();
        assert_eq!(ids(&all), vec!["1", "2", "3"]);
        assert_eq!(all[1].product_id, "Gadget-XL");
        assert_eq!(all[1].quantity, 99);
    }

    #[test]
    fn test_update_only_first_match() {
        let mut repo = create_test_repo();
        repo.add(record("x", "first", "2024-03-01")).unwrap();
        repo.add(record("x", "second", "2024-03-01")).unwrap();

        repo.update(record("x", "changed", "2024-03-01")).unwrap();

        let all = repo.get_all().unwrap();
        assert_eq!(all[0].product_id, "changed");
        assert_eq!(all[1].product_id, "second");
    }

    #[test]
    fn test_update_missing_leaves_storage_unchanged() {
        let mut repo = seeded_repo();
        let before = repo.store().get(DEFAULT_COLLECTION_KEY).unwrap();

        let err = repo.update(record("missing", "x", "2024-03-01")).unwrap_err();
        assert!(err.is_not_found());

        let after = repo.store().get(DEFAULT_COLLECTION_KEY).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_on_empty_slot_does_not_create_it() {
        let mut repo = create_test_repo();
        assert!(repo.update(record("1", "x", "2024-03-01")).is_err());
        assert!(repo.store().is_empty());
    }

    #[test]
    fn test_delete_removes_all_matches() {
        let mut repo = create_test_repo();
        repo.add(record("x", "a", "2024-03-01")).unwrap();
        repo.add(record("y", "b", "2024-03-01")).unwrap();
        repo.add(record("x", "c", "2024-03-01")).unwrap();

        assert_eq!(repo.delete("x").unwrap(), 2);
        assert_eq!(ids(&repo.get_all().unwrap()), vec!["y"]);
    }

    #[test]
    fn test_delete_missing_is_success_and_noop() {
        let mut repo = seeded_repo();
        let before = repo.get_all().unwrap();

        assert_eq!(repo.delete("missing").unwrap(), 0);
        assert_eq!(repo.get_all().unwrap(), before);
    }

    #[test]
    fn test_delete_writes_even_when_slot_absent() {
        let mut repo = create_test_repo();
        assert_eq!(repo.delete("1").unwrap(), 0);
        assert_eq!(
            repo.store().get(DEFAULT_COLLECTION_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_get_by_id() {
        let repo = seeded_repo();
        assert_eq!(repo.get("2").unwrap().unwrap().product_id, "Gadget");
        assert!(repo.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_filter_by_date_range_inclusive() {
        let repo = seeded_repo();
        let hits = repo
            .filter_by_date_range(Some("2024-03-01"), Some("2024-03-02"))
            .unwrap();
        assert_eq!(ids(&hits), vec!["1", "2"]);
    }

    #[test]
    fn test_filter_by_date_range_open_sides() {
        let repo = seeded_repo();
        assert_eq!(
            ids(&repo.filter_by_date_range(Some("2024-03-02"), None).unwrap()),
            vec!["2", "3"]
        );
        assert_eq!(
            ids(&repo.filter_by_date_range(None, Some("2024-03-01")).unwrap()),
            vec!["1"]
        );
    }

    #[test]
    fn test_filter_by_date_range_no_bounds_returns_all() {
        let repo = seeded_repo();
        assert_eq!(repo.filter_by_date_range(None, None).unwrap(), repo.get_all().unwrap());
        assert_eq!(
            repo.filter_by_date_range(Some(""), Some("")).unwrap(),
            repo.get_all().unwrap()
        );
    }

    #[test]
    fn test_filter_by_date_range_invalid_bound() {
        let repo = seeded_repo();
        let err = repo
            .filter_by_date_range(Some("last week"), None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDate { .. }));
    }

    #[test]
    fn test_filter_by_product_name_case_insensitive() {
        let repo = seeded_repo();
        assert_eq!(
            ids(&repo.filter_by_product_name("WIDGET").unwrap()),
            vec!["1", "3"]
        );
        assert!(repo.filter_by_product_name("nothing").unwrap().is_empty());
    }

    #[test]
    fn test_filter_by_product_name_empty_term_returns_all() {
        let repo = seeded_repo();
        assert_eq!(repo.filter_by_product_name("").unwrap().len(), 3);
    }

    #[test]
    fn test_filter_by_product_name_empty_collection() {
        let repo = create_test_repo();
        assert!(repo.filter_by_product_name("a").unwrap().is_empty());
    }

    #[test]
    fn test_custom_collection_key() {
        let mut repo = ProductionRepository::with_key(MemoryStore::new(), "line2");
        repo.add(record("1", "p", "2024-03-01")).unwrap();

        assert_eq!(repo.key(), "line2");
        let store = repo.into_store();
        assert!(store.get("line2").unwrap().is_some());
        assert!(store.get(DEFAULT_COLLECTION_KEY).unwrap().is_none());
    }

    #[test]
    fn test_works_over_sqlite_store() {
        let mut repo = ProductionRepository::new(SqliteStore::open_in_memory().unwrap());
        repo.add(record("1", "p", "2024-03-01")).unwrap();
        repo.add(record("2", "q", "2024-03-02")).unwrap();
        repo.delete("1").unwrap();

        assert_eq!(ids(&repo.get_all().unwrap()), vec!["2"]);
    }
}
