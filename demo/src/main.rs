//! Clinical deliberation panel demo CLI
//!
//! Runs a five-specialist deliberation over a patient record and prints the
//! result as pretty JSON on stdout. Log lines go to stderr.
//!
//! Usage:
//!   cargo run -p demo -- sample > patient.json
//!   cargo run -p demo -- deliberate --patient patient.json --offline --dashboard
//!   cargo run -p demo -- deliberate --patient patient.json --config crates/dxpanel-clinical/config/panel.toml
//!   cargo run -p demo -- check-config --config crates/dxpanel-clinical/config/panel.toml
//!
//! A failed generation call never fails the command: it is absorbed into the
//! result. Only unreadable input and bad configuration exit non-zero.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dxpanel_audit::InMemoryTranscript;
use dxpanel_clinical::{
    build_panel, default_config, format_for_dashboard, mock_data::sample_patient_record, DashboardView,
    OfflineGenerator,
};
use dxpanel_config::PanelConfig;
use dxpanel_contracts::{
    consensus::DeliberationResult,
    error::{PanelError, PanelResult},
    patient::PatientRecord,
};
use dxpanel_core::traits::Generator;
use dxpanel_gemini::GeminiGenerator;

// ── Startup ───────────────────────────────────────────────────────────────────

/// Load `path`, or the nearest `.env` above the working directory.
fn load_dotenv(path: Option<&Path>) -> Result<PathBuf, dotenvy::Error> {
    match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    }
}

/// RUST_LOG when set and valid, `warn` otherwise.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_logging() {
    // Set RUST_LOG=info (or debug) to follow the debate round by round.
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// ── CLI definition ────────────────────────────────────────────────────────────

/// Clinical deliberation panel.
///
/// Five virtual specialists debate a patient record over bounded rounds and
/// a chair merges their positions into one verdict.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Multi-specialist clinical deliberation panel",
    long_about = "Runs a bounded-round deliberation between five virtual clinical specialists\n\
                  and prints the debate history, final verdict and panel metadata as JSON."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deliberate over a patient record stored as JSON.
    Deliberate {
        /// Path to the patient record.
        #[arg(long)]
        patient: PathBuf,
        /// Panel configuration (TOML). Defaults to the bundled configuration.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Answer every prompt with canned responses instead of calling the model.
        #[arg(long)]
        offline: bool,
        /// Append the flattened dashboard view to the output.
        #[arg(long)]
        dashboard: bool,
        /// Override the configured round cap.
        #[arg(long)]
        max_rounds: Option<u32>,
        /// Override the configured consensus threshold.
        #[arg(long)]
        threshold: Option<f64>,
        /// Write the hash-chained round transcript to this file.
        #[arg(long)]
        transcript: Option<PathBuf>,
    },
    /// Print the fictional sample patient record.
    Sample,
    /// Load and validate a configuration file.
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // `.env` may set RUST_LOG, so it is read before the subscriber exists.
    let dotenv = load_dotenv(None);
    init_logging();
    match &dotenv {
        Ok(path) => info!(path = %path.display(), ".env loaded"),
        Err(e) => info!(error = %e, "no .env file loaded"),
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Deliberate {
            patient,
            config,
            offline,
            dashboard,
            max_rounds,
            threshold,
            transcript,
        } => run_deliberate(DeliberateArgs {
            patient,
            config,
            offline,
            dashboard,
            max_rounds,
            threshold,
            transcript,
        }),
        Command::Sample => print_json(&sample_patient_record()),
        Command::CheckConfig { config } => run_check_config(config),
    };

    if let Err(e) = result {
        eprintln!("demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

struct DeliberateArgs {
    patient: PathBuf,
    config: Option<PathBuf>,
    offline: bool,
    dashboard: bool,
    max_rounds: Option<u32>,
    threshold: Option<f64>,
    transcript: Option<PathBuf>,
}

fn run_deliberate(args: DeliberateArgs) -> PanelResult<()> {
    let mut config = match &args.config {
        Some(path) => PanelConfig::from_file(path)?,
        None => default_config()?,
    };
    if let Some(max_rounds) = args.max_rounds {
        config.panel.max_rounds = max_rounds;
    }
    if let Some(threshold) = args.threshold {
        config.panel.consensus_threshold = threshold;
    }
    config.validate()?;

    let record = read_patient(&args.patient)?;

    let generator: Arc<dyn Generator> = if args.offline {
        Arc::new(OfflineGenerator::new())
    } else {
        Arc::new(GeminiGenerator::from_settings(&config.generator)?)
    };
    info!(
        model = generator.model_identifier(),
        max_rounds = config.panel.max_rounds,
        threshold = config.panel.consensus_threshold,
        "panel configured"
    );

    let recorder = InMemoryTranscript::new();
    let result = build_panel(&config.panel, generator).deliberate_recorded(&record, &recorder);

    if let Some(path) = &args.transcript {
        let exported = recorder.export()?;
        let text = to_pretty(&exported)?;
        fs::write(path, text).map_err(|e| PanelError::TranscriptWriteFailed {
            reason: format!("failed to write transcript to '{}': {}", path.display(), e),
        })?;
        if !recorder.verify_integrity() {
            warn!(path = %path.display(), "transcript failed its integrity check");
        }
    }

    if args.dashboard {
        print_json(&WithDashboard {
            dashboard_format: format_for_dashboard(&result),
            result: &result,
        })
    } else {
        print_json(&result)
    }
}

/// The deliberation result with the dashboard view appended.
#[derive(Serialize)]
struct WithDashboard<'a> {
    #[serde(flatten)]
    result: &'a DeliberationResult,
    dashboard_format: DashboardView,
}

fn run_check_config(path: PathBuf) -> PanelResult<()> {
    let config = PanelConfig::from_file(&path)?;
    eprintln!("configuration OK: {}", path.display());
    print_json(&config)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_patient(path: &Path) -> PanelResult<PatientRecord> {
    let text = fs::read_to_string(path).map_err(|e| PanelError::ConfigError {
        reason: format!("failed to read patient record '{}': {}", path.display(), e),
    })?;
    let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| PanelError::ConfigError {
        reason: format!("patient record '{}' is not valid JSON: {}", path.display(), e),
    })?;
    if !value.is_object() {
        return Err(PanelError::ConfigError {
            reason: format!("patient record '{}' must be a JSON object", path.display()),
        });
    }
    Ok(PatientRecord::new(value))
}

fn to_pretty<T: Serialize>(value: &T) -> PanelResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| PanelError::Serialization {
        reason: e.to_string(),
    })
}

fn print_json<T: Serialize>(value: &T) -> PanelResult<()> {
    println!("{}", to_pretty(value)?);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotenv_log_level_reaches_the_filter() {
        let dir = std::env::temp_dir().join(format!("dxpanel-demo-env-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let env_file = dir.join(".env");
        fs::write(&env_file, "RUST_LOG=dxpanel_core=debug\n").unwrap();
        std::env::remove_var("RUST_LOG");

        let loaded = load_dotenv(Some(&env_file)).unwrap();
        assert_eq!(loaded, env_file);
        assert_eq!(log_filter().to_string(), "dxpanel_core=debug");

        std::env::remove_var("RUST_LOG");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_dotenv_is_reported_not_fatal() {
        let missing = std::env::temp_dir().join("dxpanel-demo-no-such-dir").join(".env");
        assert!(load_dotenv(Some(&missing)).is_err());
    }
}
