// Sales Dashboard CLI - loads the data file and prints the default view

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

use sales_dashboard::config::Config;
use sales_dashboard::{report, Dashboard, Dataset};

fn main() {
    if let Err(e) = run() {
        error!("{:#}", e);
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::load_from_dir(Path::new("."))?.unwrap_or_default();
    init_logging(config.general.verbose);

    info!("Sales Dashboard v{}", sales_dashboard::VERSION);

    // Optional positional argument overrides the configured data file
    let data_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data.path.clone());
    debug!("Data file: {}", data_path.display());

    let dataset = Dataset::load(&data_path)
        .with_context(|| format!("Failed to load sales data from {}", data_path.display()))?;

    let dashboard = Dashboard::new(dataset);
    let view = dashboard.view(&dashboard.default_filter());
    info!("{}", view.metrics.summary());

    println!("{}", report::render(&view, &config.display)?);
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("⚠️  Logging already initialized");
    }
}
