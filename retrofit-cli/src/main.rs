use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};

use retrofit_cli::app::{self, WalkPlan};
use retrofit_cli::config::{self, API_URL_ENV, FlagOverrides};
use retrofit_cli::logging::{self, LogSettings};
use retrofit_cli::report;
use retrofit_core::{RetrofitSubtype, Step, WizardController};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Retrofit financing wizard.
///
/// Resolves an address to a building, quotes the window upgrades on offer,
/// runs the break-even calculation for one of them and lists contractors,
/// then prints a report.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// TOML file with `[backend]` and `[wizard]` tables.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Backend to use (overrides the config file).
    #[arg(long)]
    backend: Option<String>,

    /// Base URL of the retrofit service (overrides config and RETROFIT_API_URL).
    #[arg(long)]
    api_url: Option<String>,

    /// Shortest postal code that is looked up.
    #[arg(long)]
    min_postcode_len: Option<usize>,

    /// Postal code to start from.
    #[arg(long)]
    postcode: String,

    /// Street; needed when the postal code has several.
    #[arg(long)]
    street: Option<String>,

    /// Building id; needed when the street has several buildings.
    #[arg(long)]
    building: Option<String>,

    /// Override a building attribute, e.g. `--set RentPerUnit=900`.
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_key_value)]
    overrides: Vec<(String, String)>,

    /// Retrofit option to calculate: `double` or `triple`.
    #[arg(long, value_parser = parse_subtype)]
    option: Option<RetrofitSubtype>,

    /// Last step to run (1 = address … 4 = contractors).
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=4))]
    stop_at: u8,

    /// Log filter, e.g. `debug` or `retrofit_core=trace`.
    #[arg(long)]
    log_level: Option<String>,

    /// Append log output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Keep logs off the terminal (the log file still receives them).
    #[arg(long, short)]
    quiet: bool,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{s}'"))
}

fn parse_subtype(s: &str) -> Result<RetrofitSubtype, String> {
    RetrofitSubtype::parse(s).ok_or_else(|| format!("unknown retrofit option '{s}'"))
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&LogSettings {
        directive: cli.log_level.clone(),
        file: cli.log_file.clone(),
        quiet: cli.quiet,
    })?;

    let flags = FlagOverrides {
        backend: cli.backend,
        api_url: cli.api_url,
        min_postal_code_len: cli.min_postcode_len,
    };
    let env_url = std::env::var(API_URL_ENV).ok();
    let config = config::resolve(cli.config.as_deref(), env_url.as_deref(), &flags)
        .context("loading configuration")?;

    debug!("connecting to {} backend", config.backend.backend);
    let registry = app::build_registry();
    let backend = registry
        .create(&config.backend)
        .await
        .with_context(|| format!("creating '{}' backend", config.backend.backend))?;

    let plan = WalkPlan {
        postal_code: cli.postcode,
        street: cli.street,
        building_id: cli.building,
        overrides: cli.overrides,
        option: cli.option,
        stop_at: Step::from_number(cli.stop_at).unwrap_or(Step::Contractors),
    };

    let mut controller = WizardController::new(backend, config.wizard);
    let outcome = app::walk(&mut controller, &plan).await;

    print!("{}", report::render(controller.state()));
    if let Err(e) = &outcome {
        error!(step = %controller.step(), "wizard stopped: {e:#}");
    }
    outcome
}
