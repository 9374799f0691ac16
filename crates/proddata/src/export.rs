//! Export of the currently visible records.
//!
//! An [`Exporter`] receives the filtered view and writes a downloadable
//! artifact to any [`Write`] sink.

use std::io::Write;

use crate::error::{Error, Result};
use crate::record::ProductionRecord;

/// Column headers, in output order.
const CSV_HEADERS: [&str; 9] = [
    "id",
    "date",
    "productId",
    "processId",
    "workerId",
    "quantity",
    "defectCount",
    "workHours",
    "notes",
];

/// Something that turns a record list into a file.
pub trait Exporter {
    /// Short format name shown to the user, e.g. `CSV`.
    fn format_name(&self) -> &'static str;

    /// Write `records` to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot be written.
    fn export(&self, records: &[ProductionRecord], out: &mut dyn Write) -> Result<()>;
}

/// Comma (or other delimiter) separated values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvExporter {
    delimiter: char,
    include_bom: bool,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            delimiter: ',',
            include_bom: false,
        }
    }
}

impl CsvExporter {
    /// Create an exporter with the given delimiter.
    #[must_use]
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }

    /// Prefix the output with a UTF-8 byte order mark so spreadsheet
    /// applications detect the encoding.
    #[must_use]
    pub fn with_bom(mut self, include_bom: bool) -> Self {
        self.include_bom = include_bom;
        self
    }

    fn escape(&self, cell: &str) -> String {
        let cell = neutralize_formula(cell);
        if cell.contains(self.delimiter) || cell.contains(['"', '\n', '\r']) {
            format!("\"{}\"", cell.replace('"', "\"\""))
        } else {
            cell
        }
    }

    fn row(&self, cells: &[String]) -> String {
        let mut line = cells
            .iter()
            .map(|cell| self.escape(cell))
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string());
        line.push_str("\r\n");
        line
    }

    fn record_cells(record: &ProductionRecord) -> Vec<String> {
        vec![
            record.id.clone(),
            record.date.clone(),
            record.product_id.clone(),
            record.process_id.clone(),
            record.worker_id.clone(),
            record.quantity.to_string(),
            record.defect_count.to_string(),
            record.work_hours.to_string(),
            record.notes.clone().unwrap_or_default(),
        ]
    }

    /// Render `records` to a string.
    #[must_use]
    pub fn render(&self, records: &[ProductionRecord]) -> String {
        let mut out = String::new();
        if self.include_bom {
            out.push('\u{FEFF}');
        }
        let headers: Vec<String> = CSV_HEADERS.iter().map(ToString::to_string).collect();
        out.push_str(&self.row(&headers));
        for record in records {
            out.push_str(&self.row(&Self::record_cells(record)));
        }
        out
    }
}

/// Prefix text a spreadsheet would evaluate as a formula with `'`.
fn neutralize_formula(cell: &str) -> String {
    let starts_formula = matches!(
        cell.trim_start().chars().next(),
        Some('=' | '+' | '-' | '@')
    );
    if starts_formula {
        format!("'{cell}")
    } else {
        cell.to_string()
    }
}

impl Exporter for CsvExporter {
    fn format_name(&self) -> &'static str {
        "CSV"
    }

    fn export(&self, records: &[ProductionRecord], out: &mut dyn Write) -> Result<()> {
        out.write_all(self.render(records).as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| Error::export(e.to_string()))
    }
}
