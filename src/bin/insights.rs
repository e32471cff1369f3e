//! Insights CLI - Command-line interface for Journal Insights
//!
//! Commands:
//! - dashboard: Compute one dashboard from an entry export (batch mode)
//! - run: Recompute the dashboard as entries stream in on stdin
//! - validate: Validate entry documents
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use journal_insights::adapter::EntryAdapter;
use journal_insights::calendar::parse_day;
use journal_insights::encoder::DASHBOARD_SCHEMA_VERSION;
use journal_insights::pipeline::DashboardProcessor;
use journal_insights::scoring::Emotion;
use journal_insights::types::{DashboardPayload, Entry, LifeArea};
use journal_insights::{
    InsightsConfig, InsightsError, MemoryStore, INSIGHTS_VERSION, PRODUCER_NAME,
};

/// Insights - On-device aggregation engine for journal mood analytics
#[derive(Parser)]
#[command(name = "insights")]
#[command(version = INSIGHTS_VERSION)]
#[command(about = "Turn journal entries into mood dashboard views", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Overrides shared by the dashboard-producing commands
#[derive(clap::Args)]
struct EngineArgs {
    /// Configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Anchor day (YYYY-MM-DD); defaults to today on the configured calendar
    #[arg(long)]
    today: Option<String>,

    /// Minutes east of UTC used for calendar days
    #[arg(long, allow_hyphen_values = true)]
    utc_offset_minutes: Option<i32>,

    /// Trend window in days
    #[arg(long)]
    trend_days: Option<u32>,

    /// Heatmap span in days (defaults to year-to-date)
    #[arg(long)]
    heatmap_days: Option<u32>,

    /// Maximum number of ranked emotions
    #[arg(long)]
    top: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a dashboard from an entry export (batch mode)
    Dashboard {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Recompute the dashboard for every entry read from stdin (streaming mode)
    Run {
        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Flush output after each dashboard
        #[arg(long, default_value = "true")]
        flush: bool,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Validate entry documents
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one entry per line)
    Ndjson,
    /// JSON array of entries
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// One compact dashboard per line
    Ndjson,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Journal entry documents
    Input,
    /// Dashboard payload (insights.dashboard.v1)
    Output,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), InsightsCliError> {
    match cli.command {
        Commands::Dashboard {
            input,
            output,
            input_format,
            output_format,
            engine,
        } => cmd_dashboard(&input, &output, input_format, output_format, &engine),

        Commands::Run {
            output_format,
            flush,
            engine,
        } => cmd_run(output_format, flush, &engine),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_dashboard(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    engine: &EngineArgs,
) -> Result<(), InsightsCliError> {
    let input_data = read_input(input)?;
    let entries = parse_entries(&input_data, &input_format)?;
    log::info!("Loaded {} entries", entries.len());

    let processor = build_processor(engine)?;
    let today = anchor_day(&processor, engine)?;

    let dashboard = processor.process(&entries, today);
    let output_data = format_payload(&processor.payload(&dashboard), &output_format)?;

    if is_stdio(output) {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_run(
    output_format: OutputFormat,
    flush: bool,
    engine: &EngineArgs,
) -> Result<(), InsightsCliError> {
    let processor = build_processor(engine)?;
    let store = MemoryStore::new();

    let fixed_today = match &engine.today {
        Some(day) => Some(parse_day(day)?),
        None => None,
    };
    let calendar = *processor.calendar();
    let clock = move || fixed_today.unwrap_or_else(|| calendar.today(chrono::Utc::now()));

    // The subscription callback cannot return errors, so it renders through
    // its own encoder and logs failures.
    let renderer = DashboardProcessor::with_config(processor.config().clone())?;
    processor.subscribe(&store, clock, move |dashboard| {
        if dashboard.summary.total_entries == 0 {
            return;
        }
        let rendered = match format_payload(&renderer.payload(dashboard), &output_format) {
            Ok(rendered) => rendered,
            Err(e) => {
                log::error!("Failed to encode dashboard: {:?}", e);
                return;
            }
        };
        let mut stdout = io::stdout().lock();
        let written = write!(stdout, "{}", rendered).and_then(|_| {
            if flush {
                stdout.flush()
            } else {
                Ok(())
            }
        });
        if let Err(e) = written {
            log::error!("Failed to write dashboard: {}", e);
        }
    });

    let delivered =
        EntryAdapter::read_ndjson_stream(io::stdin().lock(), |entry| store.insert(entry))?;
    log::debug!("Read {} entries from stdin", delivered);

    io::stdout().flush()?;
    log::info!("Stream closed after {} entries", store.len());

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), InsightsCliError> {
    let input_data = read_input(input)?;
    let entries = parse_entries(&input_data, &input_format)?;

    let results = EntryAdapter::validate_entries(&entries);
    let invalid: std::collections::BTreeSet<usize> = results.iter().map(|r| r.index).collect();

    let report = ValidationReport {
        total_entries: entries.len(),
        valid_entries: entries.len() - invalid.len(),
        invalid_entries: invalid.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                entry_id: r.entry_id.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total entries:   {}", report.total_entries);
        println!("Valid entries:   {}", report.valid_entries);
        println!("Invalid entries: {}", report.invalid_entries);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Entry {} (index {}): {}",
                    err.entry_id.as_deref().unwrap_or("unknown"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_entries > 0 {
        Err(InsightsCliError::ValidationFailed(report.invalid_entries))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), InsightsCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "insights_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Journal Insights version {}", INSIGHTS_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Output schema: {}", DASHBOARD_SCHEMA_VERSION),
    });

    let mut offset = None;
    if let Some(config_path) = config {
        if config_path.exists() {
            let check = match fs::read_to_string(config_path) {
                Ok(content) => match InsightsConfig::from_json(&content) {
                    Ok(loaded) => {
                        offset = loaded.utc_offset_minutes;
                        DoctorCheck {
                            name: "config".to_string(),
                            status: CheckStatus::Ok,
                            message: format!(
                                "Config valid ({}-day trend window, top {} emotions)",
                                loaded.trend_window_days, loaded.top_emotions_limit
                            ),
                        }
                    }
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid config: {}", e),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                },
            };
            checks.push(check);
        } else {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist, defaults apply".to_string(),
            });
        }
    }

    checks.push(match offset {
        Some(minutes) => DoctorCheck {
            name: "calendar".to_string(),
            status: CheckStatus::Ok,
            message: format!("Calendar days use configured offset UTC{:+} min", minutes),
        },
        None => DoctorCheck {
            name: "calendar".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Calendar days use host offset UTC{:+} min",
                journal_insights::LocalCalendar::local().offset_minutes()
            ),
        },
    });

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: INSIGHTS_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Insights Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(InsightsCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), InsightsCliError> {
    let emotions: Vec<&str> = Emotion::ALL.iter().map(|e| e.as_str()).collect();
    let areas: Vec<&str> = LifeArea::ALL.iter().map(|a| a.as_str()).collect();

    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", input_json_schema(&emotions, &areas));
            } else {
                println!("Input: journal entry documents");
                println!();
                println!("- id: Unique entry identifier (required)");
                println!(
                    "- timestamp: RFC 3339 string, epoch milliseconds or {{ seconds, nanoseconds }}"
                );
                println!("- content: Free text (unused by aggregations)");
                println!(
                    "- moodLabel: One of {} (other labels score neutral)",
                    emotions.join(", ")
                );
                println!("- moodConfidence: Classifier confidence in [0, 1]");
                println!("- sleepHours: Hours slept the night before");
                println!("- lifeBalance: Ratings 0-10 keyed by {}", areas.join(", "));
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", output_json_schema());
            } else {
                println!("Output Schema: {}", DASHBOARD_SCHEMA_VERSION);
                println!();
                println!("- schema_version, producer: {{ name, version, instance_id }}");
                println!("- computed_at_utc, utc_offset_minutes");
                println!("- dashboard:");
                println!("  - anchor: Day the windows end on");
                println!("  - trend: [{{ day, label, mean_score | null, entries }}]");
                println!("  - sleep_trend: [{{ day, label, mean_hours | null }}]");
                println!("  - distribution: [{{ label, percent, count }}]");
                println!("  - top_emotions: [{{ label, count }}]");
                println!("  - summary: {{ total_entries, current_streak, longest_streak, ... }}");
                println!("  - heatmap: {{ YYYY-MM-DD: count }}");
                println!("  - life_balance: [{{ area, average, samples }}]");
            }
        }
    }

    Ok(())
}

// Helper functions

fn is_stdio(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

fn read_input(input: &Path) -> Result<String, InsightsCliError> {
    if is_stdio(input) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_entries(data: &str, format: &InputFormat) -> Result<Vec<Entry>, InsightsCliError> {
    let entries = match format {
        InputFormat::Ndjson => EntryAdapter::parse_ndjson(data)?,
        InputFormat::Json => EntryAdapter::parse_array(data)?,
    };
    Ok(entries)
}

fn build_processor(engine: &EngineArgs) -> Result<DashboardProcessor, InsightsCliError> {
    let mut config = match &engine.config {
        Some(path) => InsightsConfig::from_json(&fs::read_to_string(path)?)?,
        None => InsightsConfig::default(),
    };

    if let Some(days) = engine.trend_days {
        config.trend_window_days = days;
    }
    if let Some(days) = engine.heatmap_days {
        config.heatmap_days = Some(days);
    }
    if let Some(limit) = engine.top {
        config.top_emotions_limit = limit;
    }
    if let Some(minutes) = engine.utc_offset_minutes {
        config.utc_offset_minutes = Some(minutes);
    }

    Ok(DashboardProcessor::with_config(config)?)
}

fn anchor_day(
    processor: &DashboardProcessor,
    engine: &EngineArgs,
) -> Result<chrono::NaiveDate, InsightsCliError> {
    match &engine.today {
        Some(day) => Ok(parse_day(day)?),
        None => Ok(processor.today()),
    }
}

fn format_payload(
    payload: &DashboardPayload,
    format: &OutputFormat,
) -> Result<String, InsightsCliError> {
    match format {
        OutputFormat::Ndjson => Ok(serde_json::to_string(payload)? + "\n"),
        OutputFormat::Json => Ok(serde_json::to_string(payload)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(payload)? + "\n"),
    }
}

fn input_json_schema(emotions: &[&str], areas: &[&str]) -> String {
    let ratings: serde_json::Map<String, serde_json::Value> = areas
        .iter()
        .map(|area| {
            (
                area.to_string(),
                serde_json::json!({ "type": "number", "minimum": 0, "maximum": 10 }),
            )
        })
        .collect();

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "journal.entry",
        "description": "Journal entry document",
        "type": "object",
        "required": ["id"],
        "properties": {
            "id": { "type": "string", "minLength": 1 },
            "timestamp": {
                "oneOf": [
                    { "type": "string", "format": "date-time" },
                    { "type": "integer", "description": "Milliseconds since the Unix epoch" },
                    {
                        "type": "object",
                        "properties": {
                            "seconds": { "type": "integer" },
                            "nanoseconds": { "type": "integer" }
                        }
                    }
                ]
            },
            "content": { "type": "string" },
            "moodLabel": { "type": "string", "examples": emotions },
            "moodConfidence": { "type": "number", "minimum": 0, "maximum": 1 },
            "sleepHours": { "type": "number", "minimum": 0 },
            "lifeBalance": {
                "type": "object",
                "properties": ratings
            }
        }
    })
    .to_string()
}

fn output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": DASHBOARD_SCHEMA_VERSION,
        "description": "Journal Insights dashboard payload",
        "type": "object",
        "required": [
            "schema_version",
            "producer",
            "computed_at_utc",
            "utc_offset_minutes",
            "dashboard"
        ],
        "properties": {
            "schema_version": { "type": "string", "const": DASHBOARD_SCHEMA_VERSION },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "computed_at_utc": { "type": "string", "format": "date-time" },
            "utc_offset_minutes": { "type": "integer" },
            "dashboard": {
                "type": "object",
                "properties": {
                    "anchor": { "type": "string", "format": "date" },
                    "trend": { "type": "array", "items": { "type": "object" } },
                    "sleep_trend": { "type": "array", "items": { "type": "object" } },
                    "distribution": { "type": "array", "items": { "type": "object" } },
                    "top_emotions": { "type": "array", "items": { "type": "object" } },
                    "summary": { "type": "object" },
                    "heatmap": {
                        "type": "object",
                        "additionalProperties": { "type": "integer", "minimum": 0 }
                    },
                    "life_balance": { "type": "array", "items": { "type": "object" } }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum InsightsCliError {
    Io(io::Error),
    Engine(InsightsError),
    Json(serde_json::Error),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for InsightsCliError {
    fn from(e: io::Error) -> Self {
        InsightsCliError::Io(e)
    }
}

impl From<InsightsError> for InsightsCliError {
    fn from(e: InsightsError) -> Self {
        InsightsCliError::Engine(e)
    }
}

impl From<serde_json::Error> for InsightsCliError {
    fn from(e: serde_json::Error) -> Self {
        InsightsCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<InsightsCliError> for CliError {
    fn from(e: InsightsCliError) -> Self {
        match e {
            InsightsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            InsightsCliError::Engine(InsightsError::IoError(e)) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check that the input stream is readable".to_string()),
            },
            InsightsCliError::Engine(InsightsError::InvalidConfig(msg)) => CliError {
                code: "INVALID_CONFIG".to_string(),
                message: msg,
                hint: Some("Run 'insights doctor --config <file>' for details".to_string()),
            },
            InsightsCliError::Engine(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'insights schema input' for the entry format".to_string()),
            },
            InsightsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            InsightsCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} entries failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            InsightsCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_entries: usize,
    valid_entries: usize,
    invalid_entries: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    entry_id: Option<String>,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
