#![forbid(unsafe_code)]

//! `event-intake`: command-line front end for the event form validators.
//!
//! Runs the same validation session the form uses against a JSON file of
//! field values, computes event durations, and inspects or clears stored
//! drafts.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use event_intake::clock::{Clock, FixedClock, SystemClock};
use event_intake::draft::{DraftStore, FileDraftStore};
use event_intake::models::field::FieldValues;
use event_intake::models::form::REQUEST_EVENT_FORM;
use event_intake::schedule::date_policy::{parse_date, DateConstraintPolicy};
use event_intake::schedule::time_range::TimeRangeValidator;
use event_intake::session::{FormValidationSession, HintKind, MemoryPresenter, SubmitOutcome};
use event_intake::{AppError, GlobalConfig, Result};

/// Exit status when a check or range is rejected.
const EXIT_BLOCKED: u8 = 2;

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "event-intake", about = "Event request form validation", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a set of field values as a submit attempt would.
    Check {
        /// Form identifier (built-in or configured).
        #[arg(long, default_value = REQUEST_EVENT_FORM)]
        form: String,

        /// JSON file holding an object of field name to value.
        #[arg(long)]
        values: PathBuf,

        /// Evaluate date rules as if today were this date (YYYY-MM-DD).
        #[arg(long)]
        today: Option<String>,

        /// Report format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the length of an event between two HH:MM times.
    Duration {
        /// Start time (HH:MM).
        start: String,
        /// End time (HH:MM).
        end: String,
    },
    /// Inspect or remove a stored draft.
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
}

#[derive(Debug, Subcommand)]
enum DraftAction {
    /// Print the stored draft as JSON.
    Show {
        /// Storage key; defaults to the configured key.
        #[arg(long)]
        key: Option<String>,
    },
    /// Delete the stored draft.
    Clear {
        /// Storage key; defaults to the configured key.
        #[arg(long)]
        key: Option<String>,
    },
}

/// JSON report of a `check` run.
#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    form: &'a str,
    #[serde(flatten)]
    outcome: &'a SubmitOutcome,
    view: &'a MemoryPresenter,
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    let config = match args.config {
        Some(ref path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    info!(config = ?args.config, "configuration loaded");

    match args.command {
        Command::Check {
            form,
            values,
            today,
            format,
        } => run_check(&config, &form, &values, today.as_deref(), format),
        Command::Duration { start, end } => Ok(run_duration(&start, &end)),
        Command::Draft { action } => run_draft(&config, action),
    }
}

fn run_check(
    config: &GlobalConfig,
    form_id: &str,
    values_path: &Path,
    today: Option<&str>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let _span = tracing::info_span!("check", form_id).entered();

    let schema = config.form(form_id)?;
    let raw = std::fs::read_to_string(values_path).map_err(|err| {
        AppError::Io(format!(
            "failed to read values {}: {err}",
            values_path.display()
        ))
    })?;
    let values: FieldValues = serde_json::from_str(&raw)
        .map_err(|err| AppError::Config(format!("invalid values file: {err}")))?;

    let clock: Arc<dyn Clock> = match today {
        Some(date) => Arc::new(FixedClock::on_date(parse_date(date)?)),
        None => Arc::new(SystemClock),
    };

    let mut session = FormValidationSession::new(schema, MemoryPresenter::new())
        .with_policy(DateConstraintPolicy::from_config(&config.scheduling))
        .with_clock(clock)
        .with_values(&values);
    let outcome = session.submit();

    match format {
        OutputFormat::Json => {
            let report = CheckReport {
                form: form_id,
                outcome: &outcome,
                view: session.presenter(),
            };
            let json = serde_json::to_string_pretty(&report)
                .map_err(|err| AppError::Io(format!("failed to encode report: {err}")))?;
            println!("{json}");
        }
        OutputFormat::Text => print_check_text(&session, &outcome),
    }

    Ok(if outcome.is_allowed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_BLOCKED)
    })
}

fn print_check_text(session: &FormValidationSession<MemoryPresenter>, outcome: &SubmitOutcome) {
    let view = session.presenter();
    match outcome {
        SubmitOutcome::Allowed { .. } => println!("ok: {} passes all checks", session.schema().id),
        SubmitOutcome::Blocked {
            first_invalid,
            errors,
        } => {
            println!("blocked: {} field(s) need attention", errors.len());
            for error in errors {
                let marker = if &error.field == first_invalid { '>' } else { ' ' };
                println!("{marker} {}: {}", error.field, error.message);
            }
        }
    }

    for field in &session.schema().fields {
        for kind in [HintKind::DateInfo, HintKind::Duration] {
            if let Some(hint) = view.hint(&field.name, kind) {
                println!("  {}: {hint}", field.name);
            }
        }
    }
}

fn run_duration(start: &str, end: &str) -> ExitCode {
    let range = TimeRangeValidator::validate(start, end);
    if let Some(message) = range.verdict.message() {
        println!("{message}");
        return ExitCode::from(EXIT_BLOCKED);
    }
    match range.duration {
        Some(duration) => println!("{duration}"),
        None => println!("Enter both a start and an end time."),
    }
    ExitCode::SUCCESS
}

fn run_draft(config: &GlobalConfig, action: DraftAction) -> Result<ExitCode> {
    let store = FileDraftStore::new(&config.draft.storage_dir)?;

    match action {
        DraftAction::Show { key } => {
            let key = key.unwrap_or_else(|| config.draft.storage_key.clone());
            match store.load(&key)? {
                Some(values) => {
                    let json = serde_json::to_string_pretty(&values)?;
                    println!("{json}");
                }
                None => println!("no draft stored under {key}"),
            }
        }
        DraftAction::Clear { key } => {
            let key = key.unwrap_or_else(|| config.draft.storage_key.clone());
            store.clear(&key)?;
            info!(key, "draft cleared");
            println!("cleared draft {key}");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
