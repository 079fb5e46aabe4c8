//! imdb-smoke entry point
//!
//! Runs the IMDb checks in a real browser and appends one row per check to
//! the results sheet.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use imdb_smoke_common::{CsvFileStore, ResultRecorder};
use imdb_smoke_e2e::report::{render_table, write_summary};
use imdb_smoke_e2e::server::DriverProcess;
use imdb_smoke_e2e::suite::builtin_checks;
use imdb_smoke_e2e::webdriver::{Browser, WebDriverProvider};
use imdb_smoke_e2e::{CheckRunner, CheckSpec, SmokeConfig};

#[derive(Parser, Debug)]
#[command(name = "imdb-smoke")]
#[command(about = "Browser smoke checks for the IMDb website")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "imdb-smoke.toml")]
    config: PathBuf,

    /// Directory of YAML check specs (default: built-in IMDb suite)
    #[arg(short, long)]
    specs: Option<PathBuf>,

    /// Run only checks with this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only the check with this id
    #[arg(long)]
    id: Option<String>,

    /// Results sheet (CSV)
    #[arg(short, long)]
    results: Option<PathBuf>,

    /// Output directory for the run summary
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Site base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Use a running WebDriver server instead of spawning one
    #[arg(long, env = "IMDB_SMOKE_WEBDRIVER_URL")]
    webdriver_url: Option<String>,

    /// Driver executable to spawn
    #[arg(long)]
    driver_path: Option<PathBuf>,

    /// Browser to use (firefox, chrome)
    #[arg(long)]
    browser: Option<Browser>,

    /// Run the browser headless
    #[arg(long)]
    headless: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            return ExitCode::from(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn apply_overrides(config: &mut SmokeConfig, args: &Args) {
    if let Some(specs) = &args.specs {
        config.specs_dir = Some(specs.clone());
    }
    if let Some(results) = &args.results {
        config.results_path = results.clone();
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(url) = &args.webdriver_url {
        config.webdriver.url = Some(url.clone());
    }
    if let Some(path) = &args.driver_path {
        config.webdriver.driver_path = Some(path.clone());
    }
    if let Some(browser) = args.browser {
        config.webdriver.browser = browser;
    }
    if args.headless {
        config.webdriver.headless = true;
    }
}

fn select_checks(config: &SmokeConfig, args: &Args) -> anyhow::Result<Vec<CheckSpec>> {
    let mut checks = match &config.specs_dir {
        Some(dir) => CheckSpec::load_all(dir)
            .with_context(|| format!("loading check specs from {}", dir.display()))?,
        None => builtin_checks()?,
    };

    if let Some(tag) = &args.tag {
        checks = CheckSpec::filter_by_tag(checks, tag);
    }
    if let Some(id) = &args.id {
        checks = CheckSpec::filter_by_id(checks, id);
        if checks.is_empty() {
            anyhow::bail!("Check not found: {}", id);
        }
    }
    Ok(checks)
}

async fn async_main(args: Args) -> anyhow::Result<bool> {
    let mut config = SmokeConfig::load(&args.config)?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    info!("imdb-smoke v{}", imdb_smoke_common::VERSION);

    let checks = select_checks(&config, &args)?;
    if checks.is_empty() {
        warn!("No checks selected");
        return Ok(true);
    }

    // Keep the driver process alive for the whole run; dropped at the end
    let (server_url, _driver) = match &config.webdriver.url {
        Some(url) => (url.clone(), None),
        None => {
            let driver = DriverProcess::spawn(config.driver_process()).await?;
            (driver.server_url().to_string(), Some(driver))
        }
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; finishing current check and stopping");
                cancel.cancel();
            }
        });
    }

    let provider = WebDriverProvider::new(config.session(&server_url));
    let recorder = ResultRecorder::new(CsvFileStore::new(&config.results_path));
    let runner = CheckRunner::new(provider, recorder, config.runner_options())
        .with_cancellation(cancel);

    let suite = runner.run_checks(&checks).await?;

    println!("{}", render_table(&suite));
    write_summary(&suite, &config.output_dir)?;
    info!("Results appended to {}", config.results_path.display());

    Ok(suite.success())
}
