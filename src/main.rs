use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod config;
mod media;
mod publish;
mod runner;
mod utils;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long)]
    config: Option<String>,

    /// Media folder to pick from, overriding the config file
    #[arg(short, long)]
    folder: Option<String>,
}

fn get_config_path(args: &Args) -> Option<String> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }

    if let Ok(path) = std::env::var("CONFIG_FILE") {
        return Some(path);
    }

    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        let config_path = format!("{}/quotecast/config.toml", xdg_config_home);
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let config_path = format!("{}/.config/quotecast/config.toml", home.display());
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    None
}

fn init_logging(format: &str) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = get_config_path(&args);
    let mut config = crate::config::Config::load(config_path.as_deref()).with_context(|| {
        format!(
            "Failed to load config from {}",
            config_path.as_deref().unwrap_or("environment")
        )
    })?;

    init_logging(config.get_logging_format());
    info!("Starting quotecast...");

    match &config_path {
        Some(path) => info!("Loaded config from: {}", path),
        None => info!("No config file found, using defaults and environment"),
    }

    if let Some(folder) = args.folder {
        config.run.folder = folder;
    }

    let source = media::CloudinaryClient::new(&config)?;
    let publishers = publish::build_publishers(&config)?;

    let folder = config.run.folder.clone();
    let runner = runner::Runner::new(&config, &source, &publishers);
    let summary = runner.run(&folder, &mut rand::rng()).await?;

    info!(
        "Posted from folder '{}' ({} assets available)",
        summary.folder, summary.asset_count
    );
    summary.log();

    Ok(())
}
