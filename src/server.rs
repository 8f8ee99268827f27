//! The MCP tool host.
//!
//! [`ToolHost`] declares the tool catalog with `rmcp`'s router macros and
//! delegates each call to the [`Toolbox`]. [`serve`] exposes it over
//! streamable HTTP at [`MCP_PATH`].

use std::future::Future;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::tools::{ToolError, Toolbox};

pub const MCP_PATH: &str = "/mcp";
pub const SERVER_NAME: &str = "Custom MCP Server";
pub const SERVER_INSTRUCTIONS: &str = "A custom MCP server with a custom tool.";

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WeatherArgs {
    #[schemars(description = "City or place to get the weather for")]
    pub location: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BookArgs {
    #[schemars(description = "Title or keywords of the book")]
    pub book_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchArgs {
    #[schemars(description = "Search query")]
    pub query: String,
    #[schemars(description = "Maximum number of results")]
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_max_results() -> u32 {
    5
}

fn text_result(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        McpError::internal_error(err.to_string(), None)
    }
}

#[derive(Debug, Clone)]
pub struct ToolHost {
    toolbox: Toolbox,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ToolHost {
    pub fn new(toolbox: Toolbox) -> Self {
        Self {
            toolbox,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "get_date_time",
        title = "Get Current Date and Time",
        description = "Returns the current date and time in YYYY-MM-DD HH:MM:SS format."
    )]
    async fn get_date_time(&self) -> Result<CallToolResult, McpError> {
        info!("get_date_time called");
        Ok(text_result(self.toolbox.date_time()))
    }

    #[tool(
        name = "weather_info",
        title = "Get Weather Information",
        description = "Fetches current weather information for a given location using OpenWeatherMap API."
    )]
    async fn weather_info(
        &self,
        Parameters(WeatherArgs { location }): Parameters<WeatherArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!("weather_info called for {}", location);
        let text = self.toolbox.weather(&location).await.map_err(|e| {
            warn!("weather_info failed: {}", e);
            McpError::from(e)
        })?;
        Ok(text_result(text))
    }

    #[tool(
        name = "get_book",
        title = "Get Book Information",
        description = "Fetches book information from Google Books API based on the book name."
    )]
    async fn get_book(
        &self,
        Parameters(BookArgs { book_name }): Parameters<BookArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!("get_book called for {:?}", book_name);
        let text = self.toolbox.book(&book_name).await.map_err(|e| {
            warn!("get_book failed: {}", e);
            McpError::from(e)
        })?;
        Ok(text_result(text))
    }

    #[tool(
        name = "ddg_search",
        title = "DuckDuckGo Search",
        description = "Performs a web search using DuckDuckGo's Instant and current Answer API."
    )]
    async fn ddg_search(
        &self,
        Parameters(SearchArgs { query, max_results }): Parameters<SearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!("ddg_search called for {:?}", query);
        let text = self
            .toolbox
            .search(&query, max_results as usize)
            .await
            .map_err(|e| {
                warn!("ddg_search failed: {}", e);
                McpError::from(e)
            })?;
        Ok(text_result(text))
    }
}

#[tool_handler]
impl ServerHandler for ToolHost {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(SERVER_INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Axum router serving `host` over streamable HTTP at [`MCP_PATH`].
///
/// Every MCP session gets its own clone of the host.
pub fn router(host: ToolHost) -> axum::Router {
    let service = StreamableHttpService::new(
        move || Ok(host.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );
    axum::Router::new().nest_service(MCP_PATH, service)
}

/// Serve `host` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, host: ToolHost, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(
        "Tool host listening on http://{}{}",
        listener.local_addr()?,
        MCP_PATH
    );
    axum::serve(listener, router(host))
        .with_graceful_shutdown(shutdown)
        .await
}
