use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use afd_expert::source::{decode, read_bytes};
use afd_expert::{interpret_report, write_csv, AfdEngine, AfdReport, Config, FileDetails, Layout};

#[derive(Parser, Debug)]
#[command(name = "afd-expert", version, about = "AFD record classification and validation")]
struct Cli {
    #[arg(long, global = true, help = "Record layout: 671 or 1510 (env: AFD_LAYOUT)")]
    layout: Option<Layout>,
    #[arg(
        long,
        global = true,
        help = "Refuse sources larger than N bytes, 0 for no limit (env: AFD_MAX_BYTES)"
    )]
    max_bytes: Option<u64>,
    #[arg(long, global = true, help = "Log filter, e.g. warn or afd_expert=debug (env: AFD_LOG)")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a file and print the JSON report
    Validate {
        file: PathBuf,
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Header fields, counts per type and fingerprint
    Details { file: PathBuf },
    /// Rejected lines with the reason for each
    Invalid { file: PathBuf },
    /// Accepted records, optionally of a single type
    Records {
        file: PathBuf,
        #[arg(long = "type")]
        record_type: Option<char>,
    },
    /// Accepted records containing a term (case-insensitive)
    Search { file: PathBuf, term: String },
    /// Human-readable decoding of accepted records in NSR order
    Interpret {
        file: PathBuf,
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration, flags win over environment
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(layout) = cli.layout {
        config.layout = layout;
    }
    if let Some(max_bytes) = cli.max_bytes {
        config.max_bytes = (max_bytes > 0).then_some(max_bytes);
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }

    init_tracing(&config.log_level)?;

    run(cli.command, &config)
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("Invalid log level '{}'", level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
    Ok(())
}

fn run(command: Commands, config: &Config) -> Result<()> {
    let engine = AfdEngine::new(config.layout);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Validate { file, pretty } => {
            let (report, _) = load(&engine, &file, config)?;
            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            writeln!(out, "{}", json)?;
        }
        Commands::Details { file } => {
            let (report, bytes) = load(&engine, &file, config)?;
            writeln!(out, "{}", FileDetails::from_report(&report, &bytes))?;
        }
        Commands::Invalid { file } => {
            let (report, _) = load(&engine, &file, config)?;
            for (line, reason) in report.invalid_with_reasons() {
                match reason {
                    Some(reason) => writeln!(out, "{}\t{}", line, reason)?,
                    None => writeln!(out, "{}", line)?,
                }
            }
        }
        Commands::Records { file, record_type } => {
            let (report, _) = load(&engine, &file, config)?;
            let registers = match record_type {
                Some(code) => report.registers.filter(code),
                None => report.registers,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&registers)?)?;
        }
        Commands::Search { file, term } => {
            let (report, _) = load(&engine, &file, config)?;
            let hits = report.registers.search(&term);
            writeln!(out, "{}", serde_json::to_string_pretty(&hits)?)?;
        }
        Commands::Interpret { file, csv } => {
            let (report, _) = load(&engine, &file, config)?;
            let lines = interpret_report(&report);
            if csv {
                write_csv(&lines, &mut out).context("Failed to write CSV")?;
            } else {
                for line in &lines {
                    writeln!(out, "{}", line)?;
                }
            }
        }
    }

    Ok(())
}

/// Read a file ("-" for stdin) and validate it; raw bytes come back for the fingerprint
fn load(engine: &AfdEngine, path: &Path, config: &Config) -> Result<(AfdReport, Vec<u8>)> {
    let bytes = if path == Path::new("-") {
        read_bytes(io::stdin().lock(), config.max_bytes).context("Failed to read stdin")?
    } else {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        read_bytes(file, config.max_bytes)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    let report = engine.process(&decode(bytes.clone()));
    Ok((report, bytes))
}

