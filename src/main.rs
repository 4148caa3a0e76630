//! Shift ledger HTTP service.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shift_ledger::api::{AppState, create_router};
use shift_ledger::config::ConfigLoader;
use shift_ledger::ledger::ShiftLedger;
use shift_ledger::notify::{LogGateway, NotificationDispatcher};
use shift_ledger::store::open_store;

#[derive(Parser)]
#[command(name = "shift-ledger")]
#[command(about = "Attendance ledger and payroll service", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config/shift_ledger.yaml")]
    config: PathBuf,

    /// Override the listen address from the configuration
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::load(&cli.config)?;
    info!(path = %cli.config.display(), "Configuration loaded");

    let store = open_store(config.storage())?;
    let dispatcher = NotificationDispatcher::new(Arc::new(LogGateway), config.notifications());
    let ledger = ShiftLedger::new(store, dispatcher, config.payroll().clone());

    let bind = cli.bind.unwrap_or_else(|| config.server().bind.clone());
    let router = create_router(AppState::new(config, ledger));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(address = %bind, "Shift ledger listening");
    axum::serve(listener, router).await?;

    Ok(())
}
