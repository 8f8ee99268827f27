//! gdex-server: MCP tool host
//!
//! Serves the date/time, weather, book and search tools over streamable HTTP
//! at `http://<bind>/mcp` until interrupted.

use clap::Parser;
use gdex::config::{parse_bind_addr, ServerConfig};
use gdex::options::TransportOptions;
use gdex::{ToolHost, Toolbox};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gdex-server")]
#[command(about = "MCP tool host: date/time, weather, books and web search", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "GDEX_BIND_ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = ServerConfig::from_env()?;
    if let Some(bind) = cli.bind.as_deref() {
        config.bind_addr = parse_bind_addr(bind)?;
    }

    if config.weather_api_key.is_none() {
        tracing::warn!("WEATHER_API_KEY is not set; weather_info will report weather as unavailable");
    }

    let toolbox = Toolbox::new(
        config.endpoints,
        config.weather_api_key,
        &TransportOptions::default(),
    )?;

    let listener = TcpListener::bind(config.bind_addr).await?;
    gdex::server::serve(listener, ToolHost::new(toolbox), async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutting down");
    })
    .await?;

    Ok(())
}
