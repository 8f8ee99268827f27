//! gdex-chat: console chat client
//!
//! Connects to the tool host, then reads questions from stdin and prints the
//! model's answers until `exit` or end of input.

use clap::Parser;
use gdex::chat;
use gdex::client::Client;
use gdex::config::{ChatConfig, CompletionConfig};
use gdex::options::{ModelOptions, TransportOptions};
use gdex::providers::{AzureOpenAi, OpenAi, Provider};
use gdex::{Agent, Conversation, RemoteToolHost};
use tracing_subscriber::EnvFilter;

const INSTRUCTIONS: &str = "Be a helpful assistant that helps the user with their queries.";

#[derive(Parser)]
#[command(name = "gdex-chat")]
#[command(about = "Chat with a model that can call the gdex tool host", long_about = None)]
#[command(version)]
struct Cli {
    /// MCP endpoint of the tool host
    #[arg(long, env = "GDEX_MCP_SERVER_URL")]
    server_url: Option<String>,
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
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = ChatConfig::from_env()?;
    if let Some(url) = cli.server_url {
        config.server_url = url;
    }

    match config.completion.clone() {
        CompletionConfig::Azure {
            endpoint,
            deployment,
            api_version,
            api_key,
        } => {
            tracing::info!("Using Azure OpenAI deployment {}", deployment);
            let client = AzureOpenAi::create_with_options(
                endpoint,
                deployment,
                api_version,
                api_key,
                ModelOptions::default().with_system(INSTRUCTIONS),
                TransportOptions::default(),
            );
            chat_with(client, &config).await
        }
        CompletionConfig::OpenAi { api_key, model } => {
            tracing::info!("Using OpenAI model {}", model);
            let client = OpenAi::create_with_options(
                api_key,
                ModelOptions::new(model).with_system(INSTRUCTIONS),
                TransportOptions::default(),
            );
            chat_with(client, &config).await
        }
    }
}

async fn chat_with<C: Client>(client: C, config: &ChatConfig) -> anyhow::Result<()> {
    let host = RemoteToolHost::connect(&config.server_url, config.request_timeout).await?;
    let agent = Agent::new(client).with_server(host);
    let mut conversation = Conversation::for_contact(config.contact_id.clone());
    tracing::info!("Conversation {}", conversation.id());

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    chat::run(&agent, &mut conversation, stdin, &mut std::io::stdout()).await?;

    Ok(())
}
