//! Data entry page controller.
//!
//! Holds what the data entry screen shows: the full dataset, the filtered
//! view, the record being edited, the record open in the detail view and the
//! master data lists. Every successful mutation reloads the full dataset from
//! the repository instead of patching the in-memory copy.

use std::io::Write;

use tracing::{debug, error, warn};

use crate::error::Result;
use crate::export::Exporter;
use crate::master::{MasterData, MasterKind};
use crate::record::ProductionRecord;
use crate::repository::ProductionRepository;
use crate::storage::KeyValueStore;

/// Banner text when a submit fails.
pub const SAVE_FAILED_MESSAGE: &str = "データの保存中にエラーが発生しました。";

/// Alert text when a delete fails.
pub const DELETE_FAILED_MESSAGE: &str = "データの削除中にエラーが発生しました。";

/// Alert text when an export fails, for the given format name.
#[must_use]
pub fn export_failed_message(format_name: &str) -> String {
    format!("{format_name}エクスポート中にエラーが発生しました。")
}

/// Controller state for the data entry page.
#[derive(Debug)]
pub struct DataEntryController<S> {
    repository: ProductionRepository<S>,
    production_data: Vec<ProductionRecord>,
    filtered_data: Vec<ProductionRecord>,
    editing: Option<ProductionRecord>,
    viewing: Option<ProductionRecord>,
    modal_open: bool,
    master: MasterData,
    submit_error: Option<String>,
    alert: Option<String>,
}

impl<S: KeyValueStore> DataEntryController<S> {
    /// Create the controller and load the dataset and master data.
    pub fn new(repository: ProductionRepository<S>) -> Self {
        let mut controller = Self {
            repository,
            production_data: Vec::new(),
            filtered_data: Vec::new(),
            editing: None,
            viewing: None,
            modal_open: false,
            master: MasterData::default(),
            submit_error: None,
            alert: None,
        };
        controller.load_data();
        controller.load_master_data();
        controller
    }

    /// Reload the full dataset and reset the filtered view to it.
    ///
    /// On failure the previous state is kept.
    pub fn load_data(&mut self) {
        match self.repository.get_all() {
            Ok(data) => {
                debug!("Loaded {} production records", data.len());
                self.filtered_data.clone_from(&data);
                self.production_data = data;
            }
            Err(e) => error!("Error loading data: {}", e),
        }
    }

    /// Reload the product, process and worker lists.
    pub fn load_master_data(&mut self) {
        self.master.reload(self.repository.store());
    }

    /// Save the form contents.
    ///
    /// While editing this updates the record being edited and leaves edit
    /// mode on success; otherwise it adds a new record. Returns whether the
    /// save succeeded; on failure [`Self::submit_error`] is set.
    pub fn handle_submit(&mut self, record: ProductionRecord) -> bool {
        self.submit_error = None;

        let result = if self.editing.is_some() {
            self.repository.update(record).map(|()| {
                self.editing = None;
            })
        } else {
            self.repository.add(record)
        };

        match result {
            Ok(()) => {
                self.load_data();
                true
            }
            Err(e) => {
                error!("Error submitting data: {}", e);
                self.submit_error = Some(SAVE_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    /// Enter edit mode with `record` pre-filled in the form.
    pub fn handle_edit(&mut self, record: ProductionRecord) {
        debug!("Editing production record {}", record.id);
        self.editing = Some(record);
    }

    /// Leave edit mode without saving.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Delete every record with `id` once the user has confirmed.
    ///
    /// Returns whether anything was attempted and succeeded. On failure
    /// [`Self::alert`] is set.
    pub fn handle_delete(&mut self, id: &str, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        match self.repository.delete(id) {
            Ok(_) => {
                self.load_data();
                true
            }
            Err(e) => {
                error!("Error deleting data: {}", e);
                self.alert = Some(DELETE_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    /// Open the detail view for `record`.
    pub fn handle_view_details(&mut self, record: ProductionRecord) {
        self.viewing = Some(record);
        self.modal_open = true;
    }

    /// Close the detail view.
    pub fn handle_close_modal(&mut self) {
        self.modal_open = false;
        self.viewing = None;
    }

    /// Filter the view by product.
    ///
    /// A blank term shows the full dataset. Otherwise the repository is
    /// queried, so the result reflects what is stored right now. A failed
    /// query is logged and shows no results.
    pub fn handle_search(&mut self, term: &str) {
        if term.trim().is_empty() {
            self.filtered_data.clone_from(&self.production_data);
            return;
        }
        match self.repository.filter_by_product_name(term) {
            Ok(filtered) => self.filtered_data = filtered,
            Err(e) => {
                warn!("Error searching data: {}", e);
                self.filtered_data.clear();
            }
        }
    }

    /// Filter the view by date range.
    ///
    /// With both bounds blank the full dataset is shown. An unparseable bound
    /// or a failed read is logged and shows no results.
    pub fn handle_date_range_change(&mut self, start: &str, end: &str) {
        if start.trim().is_empty() && end.trim().is_empty() {
            self.filtered_data.clone_from(&self.production_data);
            return;
        }
        match self
            .repository
            .filter_by_date_range(Some(start), Some(end))
        {
            Ok(filtered) => self.filtered_data = filtered,
            Err(e) => {
                warn!("Error filtering by date: {}", e);
                self.filtered_data.clear();
            }
        }
    }

    /// Export the filtered view.
    ///
    /// Returns whether the export succeeded; on failure [`Self::alert`] is set.
    pub fn handle_export(&mut self, exporter: &dyn Exporter, out: &mut dyn Write) -> bool {
        match exporter.export(&self.filtered_data, out) {
            Ok(()) => true,
            Err(e) => {
                error!("Error exporting {}: {}", exporter.format_name(), e);
                self.alert = Some(export_failed_message(exporter.format_name()));
                false
            }
        }
    }

    /// Find a record in the loaded dataset.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&ProductionRecord> {
        self.production_data.iter().find(|r| r.id == id)
    }

    /// The full dataset as last loaded.
    #[must_use]
    pub fn production_data(&self) -> &[ProductionRecord] {
        &self.production_data
    }

    /// The records currently shown.
    #[must_use]
    pub fn filtered_data(&self) -> &[ProductionRecord] {
        &self.filtered_data
    }

    /// The record being edited, if any.
    #[must_use]
    pub fn editing(&self) -> Option<&ProductionRecord> {
        self.editing.as_ref()
    }

    /// Check whether the form is in edit mode.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// The record open in the detail view, if the view is open.
    #[must_use]
    pub fn viewing(&self) -> Option<&ProductionRecord> {
        if self.modal_open {
            self.viewing.as_ref()
        } else {
            None
        }
    }

    /// Check whether the detail view is open.
    #[must_use]
    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    /// The master data lists.
    #[must_use]
    pub fn master(&self) -> &MasterData {
        &self.master
    }

    /// Display name of a record's product.
    #[must_use]
    pub fn product_name<'a>(&'a self, record: &'a ProductionRecord) -> &'a str {
        self.master
            .display_name(MasterKind::Products, &record.product_id)
    }

    /// Display name of a record's process.
    #[must_use]
    pub fn process_name<'a>(&'a self, record: &'a ProductionRecord) -> &'a str {
        self.master
            .display_name(MasterKind::Processes, &record.process_id)
    }

    /// Display name of a record's worker.
    #[must_use]
    pub fn worker_name<'a>(&'a self, record: &'a ProductionRecord) -> &'a str {
        self.master.display_name(MasterKind::Workers, &record.worker_id)
    }

    /// The save-failure banner, if the last submit failed.
    #[must_use]
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// The last alert raised by a delete or export failure.
    #[must_use]
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Clear and return the pending alert.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    /// Borrow the repository.
    pub fn repository(&self) -> &ProductionRepository<S> {
        &self.repository
    }

    /// Mutably borrow the repository.
    ///
    /// Changes made through it are not visible until [`Self::load_data`].
    pub fn repository_mut(&mut self) -> &mut ProductionRepository<S> {
        &mut self.repository
    }

    /// Look up a record straight from storage, bypassing the loaded copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn fetch(&self, id: &str) -> Result<Option<ProductionRecord>> {
        self.repository.get(id)
    }
}
