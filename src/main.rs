use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use dermaview::{report, ClassifierClient, Config};

/// Command-line front-end for the dermoscopic classification service.
///
/// Settings come from `DERMAVIEW_*` environment variables; flags override them.
#[derive(Debug, Parser)]
#[command(name = "dermaview", version, about)]
struct Cli {
    /// Base URL of the classification API.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Base URL of the host serving training plots.
    #[arg(long, global = true)]
    plots_base: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload an image and print the classification.
    Classify {
        image: PathBuf,
        /// Print the normalized class probabilities as JSON instead.
        #[arg(long)]
        json: bool,
    },
    /// Print the backend health check.
    Health,
    /// List the available training plots.
    Plots,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let client = ClassifierClient::new(config)?;

    match cli.command {
        Command::Classify { image, json } => {
            let result = client
                .classify_path(&image)
                .with_context(|| format!("failed to classify {}", image.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result.class_probabilities())?);
            } else {
                print!("{}", report::classification_report(&result));
            }
        }
        Command::Health => {
            let health = client.health().context("failed to load health check")?;
            print!("{}", report::health_report(&health));
        }
        Command::Plots => {
            let plots = client.plots().context("failed to load plots")?;
            print!("{}", report::plots_report(&plots, |p| client.plot_url(p)));
        }
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(url) = &cli.backend {
        config.backend_url = url.clone();
    }
    if let Some(url) = &cli.plots_base {
        config.plots_base_url = url.clone();
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout = Duration::from_secs(secs);
    }
    Ok(config.validate()?)
}
