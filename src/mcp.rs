//! Client side of the MCP tool bridge.
//!
//! The agent talks to tools through the [`McpServer`] trait. Any `rmcp`
//! client session implements it directly; [`RemoteToolHost`] adds a
//! per-request timeout on top of a streamable-HTTP session.

use async_trait::async_trait;
use rmcp::model::{CallToolRequestParam, CallToolResult, RawContent, Tool};
use rmcp::service::{RoleClient, RunningService};
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::{ClientHandler, ServiceExt};
use serde_json::Value;
use std::future::Future;
use std::ops::Deref;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum McpError {
    #[error("MCP error: {0}")]
    Mcp(String),
    #[error("Failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error("MCP request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Tool failed: {0}")]
    Tool(String),
}

/// Trait for MCP servers that can be used by the Agent.
#[async_trait]
pub trait McpServer: Send + Sync {
    /// List available tools.
    async fn list_tools(&self) -> Result<Vec<Tool>, McpError>;

    /// Execute a tool and return its text output.
    async fn call_tool(&self, name: String, args: Value) -> Result<String, McpError>;
}

#[async_trait]
impl<S: ClientHandler + Send + Sync> McpServer for RunningService<RoleClient, S> {
    async fn list_tools(&self) -> Result<Vec<Tool>, McpError> {
        let result = self
            .deref()
            .list_tools(None)
            .await
            .map_err(|e| McpError::Mcp(e.to_string()))?;
        Ok(result.tools)
    }

    async fn call_tool(&self, name: String, args: Value) -> Result<String, McpError> {
        let params = CallToolRequestParam {
            name: name.into(),
            arguments: args.as_object().cloned(),
        };

        let result = self
            .deref()
            .call_tool(params)
            .await
            .map_err(|e| McpError::Mcp(e.to_string()))?;

        let failed = result.is_error.unwrap_or(false);
        let text = result_text(result);
        if failed {
            Err(McpError::Tool(text))
        } else {
            Ok(text)
        }
    }
}

/// Flatten the text content of a tool result.
///
/// Structured content is used only when the tool sent no text.
fn result_text(result: CallToolResult) -> String {
    let mut texts = Vec::new();
    for content in result.content {
        if let RawContent::Text(text_content) = content.raw {
            texts.push(text_content.text);
        }
    }

    if texts.is_empty() {
        if let Some(structured) = result.structured_content {
            return structured.to_string();
        }
    }

    texts.join("\n")
}

/// A tool host reached over streamable HTTP.
pub struct RemoteToolHost {
    url: String,
    request_timeout: Duration,
    service: RunningService<RoleClient, ()>,
}

impl RemoteToolHost {
    /// Connect to the tool host at `url` and perform the MCP handshake.
    ///
    /// `request_timeout` bounds the handshake and every later request.
    pub async fn connect(url: &str, request_timeout: Duration) -> Result<Self, McpError> {
        let transport = StreamableHttpClientTransport::with_client(
            reqwest::Client::new(),
            StreamableHttpClientTransportConfig::with_uri(url.to_string()),
        );

        let service = tokio::time::timeout(request_timeout, ().serve(transport))
            .await
            .map_err(|_| McpError::Timeout(request_timeout))?
            .map_err(|e| McpError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if let Some(info) = service.peer_info() {
            info!(
                "Connected to MCP server {} {} at {}",
                info.server_info.name, info.server_info.version, url
            );
        }

        Ok(Self {
            url: url.to_string(),
            request_timeout,
            service,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, McpError>
    where
        T: Send,
        F: Future<Output = Result<T, McpError>> + Send,
    {
        tokio::time::timeout(self.request_timeout, fut)
            .await
            .map_err(|_| McpError::Timeout(self.request_timeout))?
    }
}

// The rmcp session cancels itself when dropped.
impl Drop for RemoteToolHost {
    fn drop(&mut self) {
        debug!("Closing MCP session with {}", self.url);
    }
}

#[async_trait]
impl McpServer for RemoteToolHost {
    async fn list_tools(&self) -> Result<Vec<Tool>, McpError> {
        self.bounded(McpServer::list_tools(&self.service)).await
    }

    async fn call_tool(&self, name: String, args: Value) -> Result<String, McpError> {
        self.bounded(McpServer::call_tool(&self.service, name, args))
            .await
    }
}
