//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::master::MasterKind;

/// Filters shared by `list` and `export`.
///
/// A product search and a date range are separate actions on the data entry
/// page, so only one of them applies at a time.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Show records whose product contains this text (case-insensitive)
    #[arg(short, long, conflicts_with_all = ["from", "to"])]
    pub search: Option<String>,

    /// Earliest date to include (e.g. 2024-03-01)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest date to include; the whole day counts
    #[arg(long)]
    pub to: Option<String>,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Filters to apply
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Field values entered in the data entry form.
#[derive(Debug, Default, Args)]
pub struct RecordFields {
    /// Product id
    #[arg(long)]
    pub product: Option<String>,

    /// Process id
    #[arg(long)]
    pub process: Option<String>,

    /// Worker id
    #[arg(long)]
    pub worker: Option<String>,

    /// Date of the work (e.g. 2024-03-01 or 2024-03-01T08:30)
    #[arg(long)]
    pub date: Option<String>,

    /// Good units produced
    #[arg(long)]
    pub quantity: Option<u32>,

    /// Defective units
    #[arg(long)]
    pub defects: Option<u32>,

    /// Hours worked
    #[arg(long)]
    pub hours: Option<f64>,

    /// Remarks
    #[arg(long)]
    pub notes: Option<String>,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Use this id instead of generating one
    #[arg(long)]
    pub id: Option<String>,

    /// Field values; product, process, worker, date and quantity are required
    #[command(flatten)]
    pub fields: RecordFields,
}

/// Edit command arguments.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Id of the record to edit
    pub id: String,

    /// Fields to change; omitted fields keep their value
    #[command(flatten)]
    pub fields: RecordFields,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Id of the record(s) to delete
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Id of the record to show
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Filters to apply before exporting
    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Master data commands.
#[derive(Debug, Subcommand)]
pub enum MasterCommand {
    /// List one master data table
    List {
        /// Which table
        #[arg(value_enum)]
        kind: MasterKindArg,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Replace one master data table with the JSON array in FILE
    Import {
        /// Which table
        #[arg(value_enum)]
        kind: MasterKindArg,

        /// JSON file holding an array of {"id", "name", ...} objects
        file: PathBuf,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Master data table argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MasterKindArg {
    /// Products
    Products,
    /// Processes
    Processes,
    /// Workers
    Workers,
}

impl From<MasterKindArg> for MasterKind {
    fn from(arg: MasterKindArg) -> Self {
        match arg {
            MasterKindArg::Products => Self::Products,
            MasterKindArg::Processes => Self::Processes,
            MasterKindArg::Workers => Self::Workers,
        }
    }
}

/// Output format for listing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns
    #[default]
    Table,
    /// JSON array
    Json,
    /// CSV, same as `export`
    Csv,
}
