use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use tessella::actor::reactor::{Scenario, replay};
use tessella::common::config::{Config, config_file};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Replays window sessions through the tiling engine")]
struct Cli {
    /// Settings file. Defaults to ~/.tessella.toml when it exists.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Check the settings and report problems without replaying anything.
    #[arg(long)]
    validate: bool,

    /// Print the commented default settings and exit.
    #[arg(long)]
    print_default_config: bool,

    /// RON scenario to replay. The final placements are printed as JSON.
    scenario: Option<PathBuf>,
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tessella=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        return Config::read(path).with_context(|| format!("reading {}", path.display()));
    }
    match config_file().filter(|path| path.exists()) {
        Some(path) => Config::read(&path).with_context(|| format!("reading {}", path.display())),
        None => Config::parse(Config::default_file()),
    }
}

fn main() -> anyhow::Result<()> {
    let opt = Cli::parse();
    init_logging();

    if opt.print_default_config {
        print!("{}", Config::default_file());
        return Ok(());
    }

    let mut config = load_config(opt.config.as_deref())?;
    if opt.validate {
        let issues = config.validate();
        for issue in &issues {
            println!("{issue}");
        }
        if !issues.is_empty() {
            bail!("{} problem(s) in the settings", issues.len());
        }
        println!("settings are valid");
        return Ok(());
    }

    let fixes = config.auto_fix_values();
    if fixes > 0 {
        warn!("fixed {fixes} invalid setting(s), run with --validate for details");
    }

    let Some(path) = opt.scenario else {
        bail!("no scenario given");
    };
    let scenario = Scenario::read(&path)?;
    info!(windows = scenario.windows.len(), steps = scenario.steps.len(), "replaying");
    let placements = replay(&config, scenario)?;
    println!("{}", serde_json::to_string_pretty(&placements)?);
    Ok(())
}
