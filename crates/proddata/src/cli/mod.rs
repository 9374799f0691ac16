//! Command-line interface for proddata.
//!
//! Each subcommand is one action on the data entry page, routed through
//! [`DataEntryController`](crate::controller::DataEntryController).

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, DeleteCommand, EditCommand, ExportCommand, FilterArgs, ListCommand,
    MasterCommand, MasterKindArg, OutputFormat, RecordFields, ShowCommand, StatusCommand,
};

use crate::dates::parse_date_time;
use crate::error::{Error, Result};
use crate::logging::Verbosity;
use crate::record::ProductionRecord;

/// proddata - Record and review manufacturing production data
///
/// Keeps production entries (product, process, worker, date, quantities)
/// in a local store, with search, date filtering and CSV export.
#[derive(Debug, Parser)]
#[command(name = "proddata")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List production records
    List(ListCommand),

    /// Add a production record
    Add(AddCommand),

    /// Edit an existing production record
    Edit(EditCommand),

    /// Delete production records by id
    Delete(DeleteCommand),

    /// Show one production record in detail
    Show(ShowCommand),

    /// Export production records as CSV
    Export(ExportCommand),

    /// View or import master data
    #[command(subcommand)]
    Master(MasterCommand),

    /// Show store status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

impl RecordFields {
    /// Build a new record from the entered fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first missing required field,
    /// an invalid date error for an unparseable `--date`, or an invalid input
    /// error for negative or non-finite `--hours`.
    pub fn into_new_record(self, id: Option<String>) -> Result<ProductionRecord> {
        let product = require(self.product, "product")?;
        let process = require(self.process, "process")?;
        let worker = require(self.worker, "worker")?;
        let date = require(self.date, "date")?;
        check_date(&date)?;
        let quantity = self.quantity.ok_or_else(|| missing("quantity"))?;

        let mut record = ProductionRecord::new(product, process, worker, date, quantity);
        if let Some(id) = id {
            record.id = id;
        }
        record.defect_count = self.defects.unwrap_or_default();
        record.work_hours = self.hours.unwrap_or_default();
        record.notes = self.notes.filter(|n| !n.trim().is_empty());
        record.validate()?;
        Ok(record)
    }

    /// Apply the entered fields on top of an existing record.
    ///
    /// # Errors
    ///
    /// Returns an invalid date error for an unparseable `--date`, or an
    /// invalid input error for negative or non-finite `--hours`.
    pub fn apply_to(self, mut record: ProductionRecord) -> Result<ProductionRecord> {
        if let Some(product) = self.product {
            record.product_id = product;
        }
        if let Some(process) = self.process {
            record.process_id = process;
        }
        if let Some(worker) = self.worker {
            record.worker_id = worker;
        }
        if let Some(date) = self.date {
            check_date(&date)?;
            record.date = date;
        }
        if let Some(quantity) = self.quantity {
            record.quantity = quantity;
        }
        if let Some(defects) = self.defects {
            record.defect_count = defects;
        }
        if let Some(hours) = self.hours {
            record.work_hours = hours;
        }
        if let Some(notes) = self.notes {
            record.notes = Some(notes).filter(|n| !n.trim().is_empty());
        }
        record.validate()?;
        Ok(record)
    }
}

fn require(value: Option<String>, field: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| missing(field))
}

fn check_date(date: &str) -> Result<()> {
    match parse_date_time(date) {
        Some(_) => Ok(()),
        None => Err(Error::invalid_date(date)),
    }
}

fn missing(field: &str) -> Error {
    Error::invalid_input(format!("--{field} is required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "proddata");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["proddata", "-q", "status"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["proddata", "status"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["proddata", "-v", "status"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["proddata", "-vv", "status"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["proddata", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_list_with_search() {
        let cli = parse(&["proddata", "list", "--search", "widget", "-f", "json"]);
        let Command::List(list) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(list.filter.search.as_deref(), Some("widget"));
        assert_eq!(list.format, OutputFormat::Json);
    }

    #[test]
    fn test_search_conflicts_with_date_range() {
        let result = Cli::try_parse_from(["proddata", "list", "--search", "a", "--from", "2024-01-01"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_add() {
        let cli = parse(&[
            "proddata", "add", "--product", "p1", "--process", "c1", "--worker", "w1", "--date",
            "2024-03-01", "--quantity", "12", "--hours", "1.5",
        ]);
        let Command::Add(add) = cli.command else {
            panic!("expected add");
        };
        let record = add.fields.into_new_record(add.id).unwrap();
        assert_eq!(record.product_id, "p1");
        assert_eq!(record.quantity, 12);
        assert!((record.work_hours - 1.5).abs() < f64::EPSILON);
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_into_new_record_keeps_given_id() {
        let fields = RecordFields {
            product: Some("p".into()),
            process: Some("c".into()),
            worker: Some("w".into()),
            date: Some("2024-03-01".into()),
            quantity: Some(1),
            ..RecordFields::default()
        };
        let record = fields.into_new_record(Some("custom".into())).unwrap();
        assert_eq!(record.id, "custom");
    }

    #[test]
    fn test_into_new_record_missing_field() {
        let fields = RecordFields {
            product: Some("p".into()),
            process: Some("c".into()),
            worker: Some("  ".into()),
            ..RecordFields::default()
        };
        let err = fields.into_new_record(None).unwrap_err();
        assert!(err.to_string().contains("--worker"));
    }

    #[test]
    fn test_apply_to_changes_only_given_fields() {
        let base = ProductionRecord::with_id("1", "p", "c", "w", "2024-03-01");
        let fields = RecordFields {
            quantity: Some(7),
            notes: Some("rework".into()),
            ..RecordFields::default()
        };
        let record = fields.apply_to(base).unwrap();

        assert_eq!(record.id, "1");
        assert_eq!(record.product_id, "p");
        assert_eq!(record.quantity, 7);
        assert_eq!(record.notes.as_deref(), Some("rework"));
    }

    #[test]
    fn test_hours_nan_is_refused() {
        let cli = parse(&[
            "proddata", "add", "--product", "p1", "--process", "c1", "--worker", "w1", "--date",
            "2024-03-01", "--quantity", "1", "--hours", "NaN",
        ]);
        let Command::Add(add) = cli.command else {
            panic!("expected add");
        };
        let err = add.fields.into_new_record(None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn test_apply_to_refuses_negative_hours() {
        let base = ProductionRecord::with_id("1", "p", "c", "w", "2024-03-01");
        let fields = RecordFields {
            hours: Some(-2.0),
            ..RecordFields::default()
        };
        assert!(matches!(
            fields.apply_to(base).unwrap_err(),
            Error::InvalidInput { .. }
        ));
    }

    #[test]
    fn test_unparseable_date_is_refused() {
        let fields = RecordFields {
            product: Some("p".into()),
            process: Some("c".into()),
            worker: Some("w".into()),
            date: Some("2024/03/01".into()),
            quantity: Some(1),
            ..RecordFields::default()
        };
        let err = fields.into_new_record(None).unwrap_err();
        assert!(matches!(err, Error::InvalidDate { .. }));

        let base = ProductionRecord::with_id("1", "p", "c", "w", "2024-03-01");
        let fields = RecordFields {
            date: Some("03-01".into()),
            ..RecordFields::default()
        };
        assert!(matches!(
            fields.apply_to(base).unwrap_err(),
            Error::InvalidDate { .. }
        ));
    }

    #[test]
    fn test_parse_master_import() {
        let cli = parse(&["proddata", "master", "import", "workers", "w.json"]);
        assert!(matches!(
            cli.command,
            Command::Master(MasterCommand::Import {
                kind: MasterKindArg::Workers,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_delete_yes() {
        let cli = parse(&["proddata", "delete", "42", "-y"]);
        let Command::Delete(delete) = cli.command else {
            panic!("expected delete");
        };
        assert_eq!(delete.id, "42");
        assert!(delete.yes);
    }
}
