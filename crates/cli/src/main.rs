// gridsel CLI - headless selection statistics and backend context

mod exit_codes;
mod replay;
mod select;

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use gridsel_config::{Settings, SettingsError};
use gridsel_core::{CountPolicy, SelectionGrid, Table};
use gridsel_io::{export_to_path, CsvExporter, ExportError, JsonExporter, LoadError, TableExporter};
use gridsel_protocol::{ChatRequest, SelectionReport};

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};
use select::SelectionArgs;

const PAYLOAD_HINT: &str = r#"expected {"columns": [...], "data": [{...}, ...]}"#;

#[derive(Parser)]
#[command(name = "gridsel")]
#[command(about = "Selection statistics and backend context for tabular data")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the per-user config directory)
    #[arg(long, global = true, env = "GRIDSEL_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override aggregate.countPolicy
    #[arg(long, global = true, value_enum)]
    count_policy: Option<PolicyArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the status-bar readout for a selection
    #[command(after_help = "\
Examples:
  gridsel stats sales.json --col amount
  gridsel stats sales.json --range 0,1:9,3 --json
  cat sales.json | gridsel stats - --all
  gridsel stats --row 0")]
    Stats {
        /// Table payload file ({columns, data}); `-` reads stdin. Omit for a blank
        /// sheet sized by table.defaultColumns x table.defaultRows
        table: Option<PathBuf>,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the chat request the backend would receive
    #[command(after_help = "\
Examples:
  gridsel context sales.json --message 'sum these' --range 0,0:2,1")]
    Context {
        /// Table payload file; `-` reads stdin. Omit for a blank sheet
        table: Option<PathBuf>,

        /// Chat message text
        #[arg(long, short = 'm')]
        message: String,

        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Replay a JSONL stream of gesture and update events
    Replay {
        /// Table payload file the replay starts from
        table: PathBuf,

        /// Event stream, one JSON object per line; `-` reads stdin
        events: PathBuf,

        /// Print each step's readout and emitted grid events to stderr
        #[arg(long)]
        trace: bool,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the table as CSV, TSV or JSON
    Export {
        /// Table payload file; `-` reads stdin
        table: PathBuf,

        /// Output format
        #[arg(long, short = 't')]
        to: ExportFormat,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Omit the header record (overrides export.headers)
        #[arg(long)]
        no_headers: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    NonEmpty,
    NumericOnly,
}

impl From<PolicyArg> for CountPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::NonEmpty => CountPolicy::NonEmpty,
            PolicyArg::NumericOnly => CountPolicy::NumericOnly,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Csv,
    Tsv,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = load_settings(cli.config.as_deref()).and_then(|settings| {
        init_logging(&settings.log_filter);
        let policy = cli
            .count_policy
            .map(CountPolicy::from)
            .unwrap_or(settings.count_policy);

        match cli.command {
            Commands::Stats {
                table,
                selection,
                json,
            } => cmd_stats(table.as_deref(), &selection, policy, json, &settings),
            Commands::Context {
                table,
                message,
                selection,
            } => cmd_context(table.as_deref(), message, &selection, policy, &settings),
            Commands::Replay {
                table,
                events,
                trace,
                json,
            } => cmd_replay(&table, &events, policy, trace, json),
            Commands::Export {
                table,
                to,
                output,
                no_headers,
            } => cmd_export(&table, to, output, no_headers, &settings),
        }
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError {
            code,
            message,
            hint,
        }) => {
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

/// RUST_LOG wins over the settings file.
fn init_logging(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    match path {
        Some(path) => Settings::load_from(path).map_err(CliError::from),
        None => Ok(Settings::load()),
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

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        let message = err.to_string();
        match err {
            SettingsError::Read { .. } | SettingsError::Write { .. } => Self::io(message),
            SettingsError::Parse { .. } => Self::parse(message)
                .with_hint("settings are JSON; lines starting with // are comments"),
            SettingsError::InvalidDelimiter(_) => Self::parse(message),
            SettingsError::Serialize(_) => Self::other(message),
        }
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Open { .. } => Self::io(err.to_string()),
            LoadError::Parse(_) => Self::parse(err.to_string()).with_hint(PAYLOAD_HINT),
        }
    }
}

impl From<ExportError> for CliError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Json(_) => Self::other(err.to_string()),
            ExportError::Io(_) | ExportError::Csv(_) => Self::io(err.to_string()),
        }
    }
}

fn load_table(path: &Path) -> Result<Table, CliError> {
    if path == Path::new("-") {
        return Ok(gridsel_io::load_table_from_reader(io::stdin().lock())?);
    }
    Ok(gridsel_io::load_table(path)?)
}

/// Load `path`, or start from an empty sheet the size the settings ask for.
fn open_table(path: Option<&Path>, settings: &Settings) -> Result<Table, CliError> {
    match path {
        Some(path) => load_table(path),
        None => {
            log::debug!(
                "no table given; using blank {}x{} sheet",
                settings.default_columns,
                settings.default_rows
            );
            Ok(Table::blank(settings.default_columns, settings.default_rows))
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError::other(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn print_report(report: &SelectionReport) {
    println!("{}", report.readout);
    match &report.selection {
        Some(d) => println!(
            "Selection: {} rows {} columns {}",
            d.mode.as_str(),
            d.rows_label(),
            d.columns.join(",")
        ),
        None => println!("Selection: none"),
    }
}

// ============================================================================
// stats
// ============================================================================

fn cmd_stats(
    table: Option<&Path>,
    selection: &SelectionArgs,
    policy: CountPolicy,
    json: bool,
    settings: &Settings,
) -> Result<(), CliError> {
    let mut grid = SelectionGrid::new(open_table(table, settings)?).with_count_policy(policy);
    selection.apply(&mut grid)?;

    let report = SelectionReport::from_grid(&grid);
    if json {
        print_json(&report)
    } else {
        print_report(&report);
        Ok(())
    }
}

// ============================================================================
// context
// ============================================================================

fn cmd_context(
    table: Option<&Path>,
    message: String,
    selection: &SelectionArgs,
    policy: CountPolicy,
    settings: &Settings,
) -> Result<(), CliError> {
    let mut grid = SelectionGrid::new(open_table(table, settings)?).with_count_policy(policy);
    selection.apply(&mut grid)?;
    print_json(&ChatRequest::new(message, &grid))
}

// ============================================================================
// replay
// ============================================================================

fn cmd_replay(
    table: &Path,
    events: &Path,
    policy: CountPolicy,
    trace: bool,
    json: bool,
) -> Result<(), CliError> {
    if table == Path::new("-") && events == Path::new("-") {
        return Err(CliError::args("table and events cannot both be read from stdin"));
    }
    let mut grid = SelectionGrid::new(load_table(table)?).with_count_policy(policy);

    let steps = if events == Path::new("-") {
        replay::parse_events(io::stdin().lock())?
    } else {
        let file = File::open(events)
            .map_err(|e| CliError::io(format!("cannot open {}: {}", events.display(), e)))?;
        replay::parse_events(BufReader::new(file))?
    };

    let count = replay::run(&mut grid, steps, trace);
    log::info!("replayed {} events (revision {})", count, grid.revision());

    let report = SelectionReport::from_grid(&grid);
    if json {
        print_json(&report)
    } else {
        print_report(&report);
        Ok(())
    }
}

// ============================================================================
// export
// ============================================================================

fn cmd_export(
    table: &Path,
    to: ExportFormat,
    output: Option<PathBuf>,
    no_headers: bool,
    settings: &Settings,
) -> Result<(), CliError> {
    let table = load_table(table)?;
    let headers = settings.export_headers && !no_headers;

    let exporter: Box<dyn TableExporter> = match to {
        ExportFormat::Csv => Box::new(CsvExporter {
            delimiter: settings.delimiter_byte()?,
            headers,
        }),
        ExportFormat::Tsv => Box::new(CsvExporter {
            headers,
            ..CsvExporter::tsv()
        }),
        ExportFormat::Json => Box::new(JsonExporter { pretty: true }),
    };

    match output {
        Some(path) => {
            export_to_path(exporter.as_ref(), &table, &path)?;
            eprintln!(
                "wrote {} rows to {}",
                table.row_count(),
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            exporter.export(&table, &mut handle)?;
            handle.flush().map_err(|e| CliError::io(e.to_string()))?;
        }
    }
    Ok(())
}
