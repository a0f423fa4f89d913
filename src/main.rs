use clap::Parser;
use flexi_logger::Logger;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use mentor_hub::account::{account_router, AccountState};

#[derive(Parser, Debug)]
#[command(name = "mentor_hub")]
struct Config {
    /// Port for the HTTP API
    #[arg(short = 'p', long, default_value_t = 8080)]
    port: u16,

    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Path to the SQLite database
    #[arg(long, default_value = "data/accounts.db")]
    db_path: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    Logger::try_with_env_or_str("info")?
        .format(flexi_logger::colored_default_format)
        .start()?;

    // Ensure data directory exists
    if let Some(parent) = std::path::Path::new(&config.db_path).parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let state = Arc::new(AccountState::new(&config.db_path)?);
    log::info!("🔐 Account store ready (db: {})", config.db_path);

    let app = axum::Router::new().nest("/api/user", account_router(state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    log::info!("🌐 Account API listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
