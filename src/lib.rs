//! # gdex - MCP tool host and tool-calling chat client
//!
//! Two halves sharing one crate:
//!
//! - The **tool host** ([`server`]) exposes four tools over MCP streamable
//!   HTTP: current date and time, weather, book lookup and instant-answer web
//!   search.
//! - The **chat client** ([`chat`]) runs a console loop, sends the
//!   conversation to a chat-completion model and lets the model call the
//!   host's tools through an [`Agent`].
//!
//! ## Architecture
//!
//! 1. **Providers** act as factories to create Clients (OpenAI or Azure OpenAI).
//! 2. **Clients** store authentication and configuration state.
//! 3. **Agents** wrap Clients and an [`McpServer`] to run the tool-execution loop.
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use gdex::model::Message;
//! use gdex::providers::{OpenAi, Provider};
//! use gdex::{Agent, RemoteToolHost};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAi::create("your-api-key".to_string(), "gpt-4o-mini".to_string());
//!     let host = RemoteToolHost::connect("http://127.0.0.1:8000/mcp", Duration::from_secs(30)).await?;
//!     let agent = Agent::new(client).with_server(host);
//!
//!     let response = agent.chat(vec![Message::user("What time is it?")]).await?;
//!     println!("{}", response.text().unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod api;
pub mod chat;
pub mod client;
pub mod config;
pub mod conversation;
pub mod http;
pub mod mcp;
pub mod model;
pub mod options;
pub mod providers;
pub mod server;
pub mod tools;

pub use agent::Agent;
pub use client::{Client, ClientError};
pub use config::{ChatConfig, CompletionConfig, ConfigError, ServerConfig};
pub use conversation::Conversation;
pub use mcp::{McpError, McpServer, RemoteToolHost};
pub use model::{Message, Response};
pub use server::ToolHost;
pub use tools::{Endpoints, ToolError, Toolbox};

// Re-export rmcp for convenience
pub use rmcp;
