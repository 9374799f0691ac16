//! `proddata` - CLI for recording production data
//!
//! Every command opens the configured store, builds the data entry
//! controller and performs one page action through it.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::process::ExitCode;

use clap::Parser;

use proddata::cli::{
    AddCommand, Cli, Command, ConfigCommand, DeleteCommand, EditCommand, ExportCommand,
    FilterArgs, ListCommand, MasterCommand, OutputFormat, ShowCommand,
};
use proddata::master::{self, MasterKind};
use proddata::{
    init_logging, Config, DataEntryController, Error, Exporter, KeyValueStore, ProductionRecord,
    ProductionRepository, SqliteStore,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;
type Controller = DataEntryController<SqliteStore>;

/// Prompt shown before deleting.
const DELETE_CONFIRM_PROMPT: &str = "このデータを削除してもよろしいですか？ [y/N] ";

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult {
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Add(cmd) => handle_add(&config, cmd),
        Command::Edit(cmd) => handle_edit(&config, cmd),
        Command::Delete(cmd) => handle_delete(&config, &cmd),
        Command::Show(cmd) => handle_show(&config, &cmd),
        Command::Export(cmd) => handle_export(&config, &cmd),
        Command::Master(cmd) => handle_master(&config, cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_controller(config: &Config) -> Result<Controller, Error> {
    let store = SqliteStore::open(config.database_path())?;
    let repository = ProductionRepository::with_key(store, config.storage.collection_key.clone());
    Ok(DataEntryController::new(repository))
}

fn apply_filter(controller: &mut Controller, filter: &FilterArgs) {
    if let Some(term) = &filter.search {
        controller.handle_search(term);
    } else if filter.from.is_some() || filter.to.is_some() {
        controller.handle_date_range_change(
            filter.from.as_deref().unwrap_or_default(),
            filter.to.as_deref().unwrap_or_default(),
        );
    }
}

fn handle_list(config: &Config, cmd: &ListCommand) -> CliResult {
    let mut controller = open_controller(config)?;
    apply_filter(&mut controller, &cmd.filter);

    match cmd.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(controller.filtered_data())?);
        }
        OutputFormat::Csv => {
            let mut out = io::stdout().lock();
            export_or_fail(&mut controller, &config.csv_exporter(), &mut out)?;
        }
        OutputFormat::Table => print_table(&controller),
    }
    Ok(())
}

fn print_table(controller: &Controller) {
    let rows = controller.filtered_data();
    if rows.is_empty() {
        println!("No production data.");
        return;
    }

    println!(
        "{:<20} {:<16} {:<16} {:<14} {:<14} {:>8} {:>7} {:>6}",
        "ID", "DATE", "PRODUCT", "PROCESS", "WORKER", "QTY", "DEFECT", "HOURS"
    );
    for record in rows {
        println!(
            "{:<20} {:<16} {:<16} {:<14} {:<14} {:>8} {:>7} {:>6.1}",
            record.id,
            record.date,
            controller.product_name(record),
            controller.process_name(record),
            controller.worker_name(record),
            record.quantity,
            record.defect_count,
            record.work_hours,
        );
    }
    println!();
    println!(
        "{} of {} record(s)",
        rows.len(),
        controller.production_data().len()
    );
}

fn handle_add(config: &Config, cmd: AddCommand) -> CliResult {
    let record = cmd.fields.into_new_record(cmd.id)?;
    let id = record.id.clone();

    let mut controller = open_controller(config)?;
    submit_or_fail(&mut controller, record)?;
    println!("Added {id}");
    Ok(())
}

fn handle_edit(config: &Config, cmd: EditCommand) -> CliResult {
    let mut controller = open_controller(config)?;
    let Some(current) = controller.find(&cmd.id).cloned() else {
        return Err(Error::not_found(cmd.id).into());
    };

    controller.handle_edit(current.clone());
    let updated = cmd.fields.apply_to(current)?;
    submit_or_fail(&mut controller, updated)?;
    println!("Updated {}", cmd.id);
    Ok(())
}

fn submit_or_fail(controller: &mut Controller, record: ProductionRecord) -> CliResult {
    if controller.handle_submit(record) {
        Ok(())
    } else {
        Err(controller
            .submit_error()
            .unwrap_or(proddata::controller::SAVE_FAILED_MESSAGE)
            .into())
    }
}

fn handle_delete(config: &Config, cmd: &DeleteCommand) -> CliResult {
    let mut controller = open_controller(config)?;
    let confirmed = cmd.yes || confirm(DELETE_CONFIRM_PROMPT)?;

    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }
    if controller.handle_delete(&cmd.id, true) {
        println!("Deleted {}", cmd.id);
        Ok(())
    } else {
        Err(controller
            .take_alert()
            .unwrap_or_else(|| proddata::controller::DELETE_FAILED_MESSAGE.to_string())
            .into())
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "はい"))
}

fn handle_show(config: &Config, cmd: &ShowCommand) -> CliResult {
    let mut controller = open_controller(config)?;
    let Some(record) = controller.find(&cmd.id).cloned() else {
        return Err(Error::not_found(cmd.id.clone()).into());
    };

    controller.handle_view_details(record);
    if let Some(record) = controller.viewing() {
        if cmd.json {
            println!("{}", serde_json::to_string_pretty(record)?);
        } else {
            print_details(&controller, record);
        }
    }
    controller.handle_close_modal();
    Ok(())
}

fn print_details(controller: &Controller, record: &ProductionRecord) {
    println!("Production Record {}", record.id);
    println!("=================={}", "=".repeat(record.id.chars().count()));
    println!();
    println!("  Date:          {}", record.date);
    println!(
        "  Product:       {} ({})",
        controller.product_name(record),
        record.product_id
    );
    println!(
        "  Process:       {} ({})",
        controller.process_name(record),
        record.process_id
    );
    println!(
        "  Worker:        {} ({})",
        controller.worker_name(record),
        record.worker_id
    );
    println!("  Quantity:      {}", record.quantity);
    println!("  Defects:       {}", record.defect_count);
    println!("  Total units:   {}", record.total_units());
    println!("  Work hours:    {}", record.work_hours);
    if let Some(notes) = &record.notes {
        println!("  Notes:         {notes}");
    }
    for (key, value) in &record.extra {
        println!("  {key}: {value}");
    }
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> CliResult {
    let mut controller = open_controller(config)?;
    apply_filter(&mut controller, &cmd.filter);
    let exporter = config.csv_exporter();

    match &cmd.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            export_or_fail(&mut controller, &exporter, &mut out)?;
            eprintln!(
                "Exported {} record(s) to {}",
                controller.filtered_data().len(),
                path.display()
            );
        }
        None => {
            let mut out = io::stdout().lock();
            export_or_fail(&mut controller, &exporter, &mut out)?;
        }
    }
    Ok(())
}

fn export_or_fail(
    controller: &mut Controller,
    exporter: &dyn Exporter,
    out: &mut dyn Write,
) -> CliResult {
    if controller.handle_export(exporter, out) {
        Ok(())
    } else {
        Err(controller
            .take_alert()
            .unwrap_or_else(|| proddata::controller::export_failed_message(exporter.format_name()))
            .into())
    }
}

fn handle_master(config: &Config, cmd: MasterCommand) -> CliResult {
    match cmd {
        MasterCommand::List { kind, json } => {
            let kind = MasterKind::from(kind);
            let controller = open_controller(config)?;
            let entries = controller.master().list(kind);
            if json {
                println!("{}", serde_json::to_string_pretty(entries)?);
            } else if entries.is_empty() {
                println!("No {kind}.");
            } else {
                for entry in entries {
                    println!("{:<16} {}", entry.id, entry.name);
                }
            }
        }
        MasterCommand::Import { kind, file } => {
            let kind = MasterKind::from(kind);
            let raw = std::fs::read_to_string(&file)?;
            let mut store = SqliteStore::open(config.database_path())?;
            let count = master::import_list(&mut store, kind, &raw)?;
            println!("Imported {count} {kind} from {}", file.display());
        }
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> CliResult {
    let controller = open_controller(config)?;
    let store = controller.repository().store();
    let stats = store.stats()?;
    let slots = store.keys()?;
    let master = controller.master();

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "collection_key": config.storage.collection_key,
            "records": controller.production_data().len(),
            "products": master.products.len(),
            "processes": master.processes.len(),
            "workers": master.workers.len(),
            "slots": slots,
            "total_bytes": stats.total_bytes,
            "db_size_bytes": stats.db_size_bytes,
            "last_write": stats.last_write,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("proddata status");
        println!("---------------");
        println!("Database:      {}", config.database_path().display());
        println!("Collection:    {}", config.storage.collection_key);
        println!("Records:       {}", controller.production_data().len());
        println!(
            "Master data:   {} products, {} processes, {} workers",
            master.products.len(),
            master.processes.len(),
            master.workers.len()
        );
        println!("Slots:         {}", slots.join(", "));
        println!("Stored bytes:  {}", stats.total_bytes);
        println!("File size:     {}", stats.db_size_bytes);
        if let Some(last_write) = &stats.last_write {
            println!("Last write:    {last_write}");
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Collection key:     {}", config.storage.collection_key);
                println!();
                println!("[Export]");
                println!("  Delimiter:          {:?}", config.export.delimiter);
                println!("  Include BOM:        {}", config.export.include_bom);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
