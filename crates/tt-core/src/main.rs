//! Triangle Test Core - verdict CLI
//!
//! The main entry point for tt-core, handling:
//! - Verdicts over exported response records
//! - Threshold and table lookups
//! - Randomized test-sheet planning
//! - Protocol configuration inspection

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tt_common::config::{ConfigSource, ProtocolConfig};
use tt_common::{
    ConfigPaths, ConfigResolver, ConfigSnapshot, Error, OutputFormat, Result, StructuredError,
    TestSessionId, SCHEMA_VERSION,
};
use tt_core::exit_codes::ExitCode;
use tt_core::ingest::{ingest, parse_records, IngestOptions};
use tt_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat, LogLevel};
use tt_core::sheet::plan_sheet;
use tt_math::{threshold_for_test_type, TestType};
use tt_report::{ReportConfig, ReportGenerator};

/// Triangle Test Core - significance verdicts for triangle sensory tests
#[derive(Parser)]
#[command(name = "tt-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to protocol.json (overrides TRIANGLE_TEST_CONFIG and the config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimum log level (overrides TT_LOG / RUST_LOG)
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    /// Log output format on stderr (overrides TT_LOG_FORMAT)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the pass/fail verdict for one session's responses
    Verdict(VerdictArgs),

    /// Significance threshold for a total sample size
    Threshold(ThresholdArgs),

    /// Print the active sample-size table with thresholds
    Table(TableArgs),

    /// Plan a randomized test sheet
    Sheet(SheetArgs),

    /// Protocol configuration management
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
struct VerdictArgs {
    /// Exported response records (JSON array)
    #[arg(long)]
    records: PathBuf,

    /// Session to report on (default: most recently active)
    #[arg(long)]
    session: Option<String>,

    /// Ignore responses submitted before this RFC 3339 instant
    #[arg(long, value_parser = parse_instant)]
    since: Option<DateTime<Utc>>,

    /// Test type selector ("difference test" or "similarity test")
    #[arg(long)]
    test_type: Option<String>,

    /// Declared respondents per group (0 or negative = unset)
    #[arg(long, allow_hyphen_values = true)]
    group_size: Option<i64>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct ThresholdArgs {
    /// Total sample size across all six groups
    #[arg(long, allow_hyphen_values = true)]
    sample_size: i64,

    /// Test type selector
    #[arg(long)]
    test_type: Option<String>,

    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct TableArgs {
    /// Test type selector
    #[arg(long)]
    test_type: Option<String>,

    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct SheetArgs {
    /// Session id (generated when omitted)
    #[arg(long)]
    session: Option<String>,

    /// Seed for a reproducible sheet
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective protocol configuration and where it came from
    Show,
    /// Validate a protocol file (default: the resolved one)
    Validate {
        /// Path to a protocol.json to check
        path: Option<PathBuf>,
    },
}

fn parse_instant(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    init_logging(&LogConfig::from_env(
        cli.global.log_level,
        cli.global.log_format,
    ));
    let run_id = generate_run_id();
    info!(run_id = %run_id, "tt-core started");

    let (format, outcome) = match &cli.command {
        Commands::Verdict(args) => (args.format, run_verdict(&cli.global, args)),
        Commands::Threshold(args) => (args.format, run_threshold(&cli.global, args)),
        Commands::Table(args) => (args.format, run_table(&cli.global, args)),
        Commands::Sheet(args) => (args.format, run_sheet(&cli.global, args)),
        Commands::Config(args) => (OutputFormat::Json, run_config(&cli.global, args)),
    };

    let exit_code = match outcome {
        Ok(code) => code,
        Err(err) => output_error(format, &err, &run_id),
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Shared helpers
// ============================================================================

fn resolver(global: &GlobalOpts) -> ConfigResolver {
    ConfigResolver::new(ConfigPaths {
        config_dir: None,
        protocol_path: global.config.clone(),
    })
}

fn load_protocol(global: &GlobalOpts) -> Result<(ProtocolConfig, ConfigSource)> {
    resolver(global).load_protocol()
}

/// CLI selector first, then the protocol's.
fn resolve_test_type(cli_selector: Option<&str>, protocol: &ProtocolConfig) -> TestType {
    let selector = cli_selector.unwrap_or(protocol.test_type.as_str());
    if !TestType::is_canonical(selector) {
        warn!(
            selector,
            fallback = %TestType::default(),
            "Unrecognized test type; using the default"
        );
    }
    TestType::from_selector(selector)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn output_error(format: OutputFormat, err: &Error, run_id: &str) -> ExitCode {
    let exit_code = ExitCode::from(err);
    match format {
        OutputFormat::Json => {
            let structured = StructuredError::from(err).with_context("run_id", run_id);
            eprintln!("{}", structured.to_json());
        }
        OutputFormat::Summary => eprintln!("error: {}", err),
        OutputFormat::Md => eprintln!("{}", err.to_human()),
    }
    exit_code
}

// ============================================================================
// Commands
// ============================================================================

fn run_verdict(global: &GlobalOpts, args: &VerdictArgs) -> Result<ExitCode> {
    let (protocol, source) = load_protocol(global)?;
    let test_type = resolve_test_type(args.test_type.as_deref(), &protocol);
    let group_size = args.group_size.unwrap_or(protocol.group_size);

    let content = std::fs::read_to_string(&args.records)?;
    let raw = parse_records(&content)?;
    let options = IngestOptions {
        session: args.session.as_deref().and_then(TestSessionId::parse),
        since: args.since,
    };
    let outcome = ingest(raw, &options)?;
    let session = outcome.session_id.clone();

    let generator = ReportGenerator::new(ReportConfig::from_protocol(&protocol));
    let data = generator
        .generate(&outcome.records, test_type, group_size, Some(session.as_str()))
        .map_err(|e| e.into_common(session.as_str()))?;
    let verdict = &data.verdict;

    match args.format {
        OutputFormat::Json => {
            let snapshot = ConfigSnapshot::new(&protocol, source)?;
            print_json(&serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "session_id": session,
                "config": snapshot,
                "ingest": {
                    "records": outcome.records.len(),
                    "sessions_seen": outcome.sessions_seen,
                    "skipped_unknown_group": outcome.skipped_unknown_group,
                    "filtered_by_time": outcome.filtered_by_time,
                    "duplicates_dropped": outcome.duplicates_dropped,
                },
                "report": data,
            }))?;
        }
        OutputFormat::Md => print!("{}", generator.render_markdown(&data)),
        OutputFormat::Summary => println!(
            "[{}] {} {}/{} correct (threshold {}, expected {})",
            session,
            if verdict.pass { "PASS" } else { "FAIL" },
            verdict.observed_correct,
            verdict.observed_total,
            verdict.threshold,
            verdict.expected_total
        ),
    }

    Ok(ExitCode::for_verdict(verdict.pass))
}

fn run_threshold(global: &GlobalOpts, args: &ThresholdArgs) -> Result<ExitCode> {
    let (protocol, _) = load_protocol(global)?;
    let test_type = resolve_test_type(args.test_type.as_deref(), &protocol);
    let table = test_type.table();
    let clamped = table.clamp(args.sample_size);
    let threshold = threshold_for_test_type(test_type, args.sample_size);

    match args.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "test_type": test_type.name(),
            "sample_size": args.sample_size,
            "clamped_sample_size": clamped,
            "out_of_domain": table.is_out_of_domain(args.sample_size),
            "threshold": threshold,
            "exact_threshold": test_type.rule().exact_threshold(clamped),
        }))?,
        OutputFormat::Md => {
            println!("# Threshold\n");
            println!("- **Test type**: {}", test_type);
            println!("- **Sample size**: {} (table lookup at {})", args.sample_size, clamped);
            println!("- **Threshold**: {} correct", threshold);
        }
        OutputFormat::Summary => println!("{} n={}: {}", test_type, args.sample_size, threshold),
    }
    Ok(ExitCode::Clean)
}

fn run_table(global: &GlobalOpts, args: &TableArgs) -> Result<ExitCode> {
    let (protocol, _) = load_protocol(global)?;
    let test_type = resolve_test_type(args.test_type.as_deref(), &protocol);
    let table = test_type.table();
    let rule = test_type.rule();

    match args.format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = table
                .rows
                .iter()
                .map(|&(n, value)| {
                    serde_json::json!({
                        "sample_size": n,
                        "value": value,
                        "threshold": table.threshold(n),
                    })
                })
                .collect();
            print_json(&serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "test_type": test_type.name(),
                "rule": rule,
                "min_sample_size": table.min_sample_size,
                "max_sample_size": table.max_sample_size,
                "rows": rows,
            }))?;
        }
        OutputFormat::Md => {
            println!("# {} table\n", test_type);
            println!("| Sample size | Table value | Threshold |");
            println!("|-------------|-------------|-----------|");
            for &(n, value) in table.rows {
                println!("| {} | {} | {} |", n, value, table.threshold(n));
            }
        }
        OutputFormat::Summary => println!(
            "{}: n={}..{} thresholds {}..{}",
            test_type,
            table.min_sample_size,
            table.max_sample_size,
            table.threshold(table.min_sample_size),
            table.threshold(table.max_sample_size)
        ),
    }
    Ok(ExitCode::Clean)
}

fn run_sheet(global: &GlobalOpts, args: &SheetArgs) -> Result<ExitCode> {
    let (protocol, _) = load_protocol(global)?;
    let session = args
        .session
        .as_deref()
        .and_then(TestSessionId::parse)
        .unwrap_or_else(TestSessionId::generate);
    let plan = plan_sheet(session, args.seed, protocol.sheet.code_digits)?;

    match args.format {
        OutputFormat::Json => print_json(&serde_json::to_value(&plan)?)?,
        OutputFormat::Md => print!("{}", plan.to_markdown()),
        OutputFormat::Summary => println!("[{}] sheet seed={}", plan.session_id, plan.seed),
    }
    Ok(ExitCode::Clean)
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> Result<ExitCode> {
    match &args.command {
        ConfigCommands::Show => {
            let (protocol, source) = load_protocol(global)?;
            let snapshot = ConfigSnapshot::new(&protocol, source)?;
            print_json(&serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "config": snapshot,
                "protocol": protocol,
            }))?;
        }
        ConfigCommands::Validate { path } => {
            let resolver = match path {
                Some(p) => ConfigResolver::new(ConfigPaths {
                    config_dir: None,
                    protocol_path: Some(p.clone()),
                }),
                None => resolver(global),
            };
            let (protocol, source) = resolver.load_protocol()?;
            print_json(&serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "status": "valid",
                "path": source.path,
                "using_defaults": source.path.is_none(),
                "test_type": protocol.resolved_test_type().name(),
                "test_type_canonical": protocol.test_type_is_canonical(),
            }))?;
        }
    }
    Ok(ExitCode::Clean)
}
