//! Stickerload CLI - Turn shop order exports into print-queue batches
//!
//! # Main Commands
//!
//! ```bash
//! stickerload transform orders.xlsx              # Records + JSON batches (24/file)
//! stickerload export-orders orders.json          # Orders JSON → dated workbooks
//! stickerload update orders.csv --id 123 --set graphicStatus=done
//! stickerload bulk-update orders.csv --ids 1,2,3 --column graphicStatus --value done
//! ```
//!
//! # Helper Commands
//!
//! ```bash
//! stickerload convert orders.csv                 # Raw table → <file>.json
//! stickerload add-name-column orders.csv         # Name column from Line Comments
//! stickerload extract --item "חברים_52+90"       # Try the extractors on one value
//! ```

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use stickerload::{
    add_name_column_in_file, bulk_update_in_file, convert_table_to_json, extract_design_variant,
    extract_personalization_name, orders_to_json, parse_json_orders, save_orders_to_tables, update_row_in_file,
    EventLog, ExportOptions, TableFormat,
};

#[derive(Parser)]
#[command(name = "stickerload")]
#[command(about = "Interpret and update sticker shop order tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: order table → records → JSON batches
    Transform {
        /// Input order table (CSV or XLSX)
        input: PathBuf,

        /// Records per JSON batch (default: 24 or STICKERLOAD_CHUNK_SIZE)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Do not write JSON batches
        #[arg(long)]
        no_export: bool,

        /// Output file for all records (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a table to JSON objects keyed by header, written to <input>.json
    Convert {
        /// Input table (CSV or XLSX)
        input: PathBuf,
    },

    /// Write an orders JSON list as dated order tables
    ExportOrders {
        /// Input JSON file (array of order objects)
        input: PathBuf,

        /// Root output folder (default: data or STICKERLOAD_OUTPUT_DIR)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Maximum orders per table
        #[arg(long)]
        max_per_file: Option<usize>,

        /// Table format: xlsx or csv (default: xlsx or STICKERLOAD_TABLE_FORMAT)
        #[arg(short, long)]
        format: Option<TableFormat>,
    },

    /// Update columns of the row with the given dbId
    Update {
        /// Order table to update
        file: PathBuf,

        /// dbId of the row
        #[arg(long)]
        id: String,

        /// Column assignment, repeatable (column=value)
        #[arg(long = "set", value_name = "COLUMN=VALUE", required = true)]
        set: Vec<String>,

        /// Save to another file instead of overwriting
        #[arg(long)]
        save_as: Option<PathBuf>,
    },

    /// Set one column on every row whose dbId is listed
    BulkUpdate {
        /// Order table to update
        file: PathBuf,

        /// Comma-separated dbIds
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<String>,

        /// Column to set
        #[arg(long)]
        column: String,

        /// New value
        #[arg(long)]
        value: String,

        /// Save to another file instead of overwriting
        #[arg(long)]
        save_as: Option<PathBuf>,
    },

    /// Add a Name column extracted from Line Comments
    AddNameColumn {
        /// Order table
        file: PathBuf,

        /// Save to another file instead of overwriting
        #[arg(long)]
        save_as: Option<PathBuf>,
    },

    /// Run the extractors on a single value
    Extract {
        /// Item name to parse into design and size
        #[arg(long)]
        item: Option<String>,

        /// Line comment to search for the personalization name
        #[arg(long)]
        comment: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let options = ExportOptions::from_env();
    let log = EventLog::new();

    let result = match cli.command {
        Commands::Transform {
            input,
            chunk_size,
            no_export,
            output,
        } => {
            let mut options = options;
            if let Some(size) = chunk_size {
                options.chunk_size = size;
            }
            options.export_json = !no_export;
            cmd_transform(&input, &options, output.as_deref(), &log)
        }

        Commands::Convert { input } => cmd_convert(&input, &log),

        Commands::ExportOrders {
            input,
            output_dir,
            max_per_file,
            format,
        } => cmd_export_orders(
            &input,
            output_dir.as_deref().unwrap_or(options.output_dir.as_path()),
            max_per_file.unwrap_or(options.chunk_size),
            format.unwrap_or(options.table_format),
            &log,
        ),

        Commands::Update { file, id, set, save_as } => cmd_update(&file, &id, &set, save_as.as_deref(), &log),

        Commands::BulkUpdate {
            file,
            ids,
            column,
            value,
            save_as,
        } => cmd_bulk_update(&file, &ids, &column, &value, save_as.as_deref(), &log),

        Commands::AddNameColumn { file, save_as } => cmd_add_name_column(&file, save_as.as_deref(), &log),

        Commands::Extract { item, comment } => cmd_extract(item.as_deref(), comment.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_transform(
    input: &Path,
    options: &ExportOptions,
    output: Option<&Path>,
    log: &EventLog,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = orders_to_json(input, options, log)?;

    eprintln!("\n⚙️  Rows: {} → records: {}", result.source_rows, result.records.len());
    if let Some(ref dir) = result.export_dir {
        eprintln!("   💾 Batches in: {}", dir.display());
    }

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_convert(input: &Path, log: &EventLog) -> Result<(), Box<dyn std::error::Error>> {
    let (rows, path) = convert_table_to_json(input, log)?;
    eprintln!("✅ {} rows written to {}", rows.len(), path.display());
    Ok(())
}

fn cmd_export_orders(
    input: &Path,
    output_dir: &Path,
    max_per_file: usize,
    format: TableFormat,
    log: &EventLog,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📦 Exporting orders: {}", input.display());

    let content = fs::read_to_string(input)?;
    let orders = parse_json_orders(&content)?;
    let files = save_orders_to_tables(&orders, output_dir, max_per_file, format, log)?;

    for file in &files {
        println!("{}", file.display());
    }
    Ok(())
}

fn cmd_update(
    file: &Path,
    id: &str,
    assignments: &[String],
    save_as: Option<&Path>,
    log: &EventLog,
) -> Result<(), Box<dyn std::error::Error>> {
    let updates = assignments
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<Vec<_>, _>>()?;

    attach_log(save_as.unwrap_or(file), log)?;
    update_row_in_file(file, id, &updates, save_as, log)?;
    Ok(())
}

fn cmd_bulk_update(
    file: &Path,
    ids: &[String],
    column: &str,
    value: &str,
    save_as: Option<&Path>,
    log: &EventLog,
) -> Result<(), Box<dyn std::error::Error>> {
    let ids: Vec<String> = ids.iter().map(|id| id.trim().to_string()).filter(|id| !id.is_empty()).collect();

    attach_log(save_as.unwrap_or(file), log)?;
    let updated = bulk_update_in_file(file, &ids, column, &Value::String(value.to_string()), save_as, log)?;
    if updated == 0 {
        eprintln!("⚠️  No rows matched the given dbIds");
    }
    Ok(())
}

fn cmd_add_name_column(file: &Path, save_as: Option<&Path>, log: &EventLog) -> Result<(), Box<dyn std::error::Error>> {
    attach_log(save_as.unwrap_or(file), log)?;
    add_name_column_in_file(file, save_as, log)?;
    Ok(())
}

fn cmd_extract(item: Option<&str>, comment: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    if item.is_none() && comment.is_none() {
        return Err("Nothing to extract: pass --item and/or --comment".into());
    }

    if let Some(item) = item {
        match extract_design_variant(item) {
            Some(variant) => println!("design: {}  ({})", variant.design(), variant),
            None => println!("design: no match, kept as '{}'", item),
        }
    }
    if let Some(comment) = comment {
        match extract_personalization_name(comment) {
            Some(name) => println!("name: '{}'", name),
            None => println!("name: no match"),
        }
    }
    Ok(())
}

/// `column=value` → (column, value). The value may itself contain `=`.
fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    match raw.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), Value::String(value.to_string())))
        }
        _ => Err(format!("Invalid assignment '{}', expected COLUMN=VALUE", raw)),
    }
}

/// Log next to the file being written.
fn attach_log(target: &Path, log: &EventLog) -> std::io::Result<PathBuf> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    log.attach_dir(dir)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
