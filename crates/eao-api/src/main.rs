use clap::Parser;
use eao_api::Server;
use eao_core::ConfigManager;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "eao-server")]
#[command(about = "Session server for editing and optimising energy asset portfolios", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./.eao.toml, then ~/.eao/config.toml)
    #[arg(short, long, env = "EAO_CONFIG")]
    config: Option<PathBuf>,

    /// Listen host, overriding configuration
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overriding configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Write a default configuration file to this path and exit
    #[arg(long, value_name = "PATH")]
    init_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = cli.init_config {
        ConfigManager::create_default_config(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let mut manager = match &cli.config {
        Some(path) => ConfigManager::load_from(path)?,
        None => ConfigManager::load()?,
    };
    manager.override_listen(cli.host, cli.port);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&manager.config().logging.level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match manager.config_path() {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("No configuration file, using defaults"),
    }

    let server = Server::new(Arc::new(manager))?;
    server.run().await
}
