// SheetVault CLI - import a spreadsheet into the store, display it back

mod exit_codes;
mod output;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use sheetvault_config::{HeaderPolicy, Settings};
use sheetvault_engine::{
    display_table, import_upload, HeaderSearchMode, ImportError, ImportOptions, ImportSummary, ReconstructMode, Upload,
};
use sheetvault_io::{SqliteStore, XlsxReader};

use exit_codes::{import_exit_code, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "svault")]
#[command(about = "Import Excel sheets into a column store and display them back")]
#[command(version)]
struct Cli {
    /// Settings file (default: platform config dir)
    #[arg(long, global = true, env = "SVAULT_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the stored data with the first sheet of an .xlsx file
    #[command(after_help = "\
Examples:
  svault import sales.xlsx
  svault import sales.xlsx --db ./sales.db --json
  svault import report.xlsx --header-policy full-scan")]
    Import {
        /// Workbook to import (.xlsx)
        file: PathBuf,

        /// Database file (overrides store.path)
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,

        /// Header detection policy (overrides import.headerPolicy)
        #[arg(long, value_name = "POLICY")]
        header_policy: Option<HeaderPolicyArg>,

        /// Rows searched by the bounded policy (overrides import.headerWindowRows)
        #[arg(long, value_name = "N")]
        header_window: Option<usize>,

        /// Print the import summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the stored data as a table
    #[command(after_help = "\
Examples:
  svault show
  svault show --aligned
  svault show --format csv > export.csv")]
    Show {
        /// Database file (overrides store.path)
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,

        /// Place values by their source row instead of by position
        #[arg(long)]
        aligned: bool,

        /// Output format
        #[arg(long, short = 'f', default_value = "table")]
        format: ShowFormat,
    },

    /// List stored columns with their value counts
    Columns {
        /// Database file (overrides store.path)
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Settings file commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the settings file location
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum HeaderPolicyArg {
    /// First non-empty row within the header window
    Bounded,
    /// Last non-empty row of the sheet
    FullScan,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShowFormat {
    Table,
    Csv,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let settings_path = cli.config.clone().unwrap_or_else(Settings::config_path);

    let result = match cli.command {
        Commands::Import { file, db, header_policy, header_window, json } => {
            let settings = Settings::load_from(&settings_path);
            cmd_import(&settings, file, db, header_policy, header_window, json)
        }
        Commands::Show { db, aligned, format } => {
            let settings = Settings::load_from(&settings_path);
            cmd_show(&settings, db, aligned, format)
        }
        Commands::Columns { db, json } => {
            let settings = Settings::load_from(&settings_path);
            cmd_columns(&settings, db, json)
        }
        Commands::Config(ConfigCommands::Path) => {
            println!("{}", settings_path.display());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Create error from an import failure with the matching exit code.
    pub fn import(err: ImportError) -> Self {
        let hint = if err.is_recoverable() {
            "previously imported data was left unchanged"
        } else {
            "the import was rolled back; previously imported data is intact"
        };
        Self { code: import_exit_code(&err), message: err.reason(), hint: Some(hint.to_string()) }
    }

    /// Create error from a failed read of the stored data.
    pub fn store_read(err: impl std::fmt::Display) -> Self {
        Self::io(format!("cannot read stored data: {}", err))
            .with_hint("check --db or store.path in the settings file")
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn import_options(settings: &Settings, policy: Option<HeaderPolicyArg>, window: Option<usize>) -> ImportOptions {
    let policy = match policy {
        Some(HeaderPolicyArg::Bounded) => HeaderPolicy::Bounded,
        Some(HeaderPolicyArg::FullScan) => HeaderPolicy::FullScan,
        None => settings.header_policy,
    };
    let header_mode = match policy {
        HeaderPolicy::Bounded => HeaderSearchMode::BoundedScanFirstNonEmpty {
            window_rows: window.unwrap_or(settings.header_window_rows),
        },
        HeaderPolicy::FullScan => HeaderSearchMode::FullScanLastNonEmpty,
    };
    ImportOptions { header_mode, max_column_name_len: settings.max_column_name_length }
}

fn open_store(settings: &Settings, db: Option<PathBuf>) -> Result<SqliteStore, CliError> {
    let path = db.unwrap_or_else(|| settings.database_path());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| CliError::io(format!("cannot create {}: {}", parent.display(), e)))?;
    }
    log::debug!("opening store at {}", path.display());
    SqliteStore::open(&path).map_err(|e| {
        CliError::io(format!("cannot open database {}: {}", path.display(), e))
            .with_hint("check --db or store.path in the settings file")
    })
}

fn cmd_import(
    settings: &Settings,
    file: PathBuf,
    db: Option<PathBuf>,
    header_policy: Option<HeaderPolicyArg>,
    header_window: Option<usize>,
    json: bool,
) -> Result<(), CliError> {
    if file.is_dir() {
        return Err(CliError::args(format!("{} is a directory", file.display())));
    }
    let bytes = fs::read(&file).map_err(|e| CliError::io(format!("cannot read {}: {}", file.display(), e)))?;
    let upload = Upload::new(upload_name(&file), bytes);
    // Rejected uploads must not create the database
    upload.validate().map_err(CliError::import)?;

    let options = import_options(settings, header_policy, header_window);
    let mut store = open_store(settings, db)?;
    let summary = import_upload(&XlsxReader::new(), &mut store, &upload, &options).map_err(CliError::import)?;

    if json {
        let out = serde_json::to_string_pretty(&summary).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", out);
    } else {
        print_summary(&upload.file_name, &summary);
    }
    Ok(())
}

fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn print_summary(file_name: &str, summary: &ImportSummary) {
    println!("Imported '{}' (sheet '{}', header row {})", file_name, summary.sheet, summary.header_row);
    println!("  columns:  {}", summary.columns_created);
    println!("  values:   {}", summary.cells_stored);
    println!("  replaced: {} columns, {} values", summary.replaced_columns, summary.replaced_cells);
    if !summary.skipped_positions.is_empty() {
        let positions: Vec<String> = summary.skipped_positions.iter().map(|p| p.to_string()).collect();
        println!("  skipped blank header positions: {}", positions.join(", "));
    }
    if summary.truncated_names > 0 {
        println!("  truncated column names: {}", summary.truncated_names);
    }
}

fn cmd_show(settings: &Settings, db: Option<PathBuf>, aligned: bool, format: ShowFormat) -> Result<(), CliError> {
    let store = open_store(settings, db)?;
    let mode = if aligned || settings.row_aligned {
        ReconstructMode::RowAligned
    } else {
        ReconstructMode::Positional
    };
    let table = display_table(&store, mode).map_err(CliError::store_read)?;

    match format {
        ShowFormat::Table => {
            if table.columns.is_empty() {
                eprintln!("No data imported yet.");
            } else {
                print!("{}", output::render_text(&table));
                eprintln!();
                eprintln!("{} row(s), {} column(s)", table.row_count(), table.columns.len());
            }
        }
        ShowFormat::Csv => print!("{}", output::render_csv(&table)?),
        ShowFormat::Json => println!("{}", output::render_json(&table)?),
    }
    Ok(())
}

fn cmd_columns(settings: &Settings, db: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let store = open_store(settings, db)?;
    let stats = store.column_stats().map_err(CliError::store_read)?;

    if json {
        let out: Vec<serde_json::Value> = stats
            .iter()
            .map(|c| serde_json::json!({ "id": c.id.0, "name": c.name, "values": c.values }))
            .collect();
        let out = serde_json::to_string_pretty(&out).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    if stats.is_empty() {
        eprintln!("No columns stored.");
        return Ok(());
    }
    println!("{:>6}  {:>8}  {}", "ID", "VALUES", "NAME");
    println!("{}", "-".repeat(40));
    for c in &stats {
        println!("{:>6}  {:>8}  {}", c.id.0, c.values, c.name);
    }
    let orphaned = store.orphaned_cell_count().map_err(CliError::store_read)?;
    if orphaned > 0 {
        log::warn!("{} stored values no longer belong to a column", orphaned);
    }
    Ok(())
}
