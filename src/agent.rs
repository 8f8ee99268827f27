//! Agent struct for automatic tool execution with chat-completion providers.

use crate::client::{Client, ClientError};
use crate::mcp::McpServer;
use crate::model::{Message, Part, Response, Usage};
use rmcp::model::Tool;
use serde_json::json;
use tracing::{debug, info, warn};

/// Agent that automatically executes tools in a loop.
///
/// Unlike the raw `Client`, an `Agent` handles tool execution automatically:
/// 1. Sends request with tool definitions from the MCP server
/// 2. Receives response with potential function calls
/// 3. Executes tools automatically
/// 4. Adds results back to conversation
/// 5. Loops until no more function calls
///
/// # Example
/// ```ignore
/// let client = OpenAi::create(api_key, "gpt-4o-mini".into());
/// let host = RemoteToolHost::connect("http://127.0.0.1:8000/mcp", Duration::from_secs(30)).await?;
/// let agent = Agent::new(client).with_server(host);
///
/// let response = agent.chat(vec![Message::user("What time is it?")]).await?;
/// ```
pub struct Agent<C: Client> {
    client: C,
    max_iterations: usize,
    server: Option<Box<dyn McpServer>>,
}

impl<C: Client> Agent<C> {
    /// Create a new agent without tools.
    pub fn new(client: C) -> Self {
        Self {
            client,
            max_iterations: 10,
            server: None,
        }
    }

    /// Set the MCP server for the agent.
    pub fn with_server<S: McpServer + 'static>(mut self, server: S) -> Self {
        self.server = Some(Box::new(server));
        self
    }

    /// Set the maximum number of iterations for the agentic loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Tool catalog advertised by the MCP server.
    ///
    /// A failing server is logged and treated as having no tools.
    pub async fn tools(&self) -> Vec<Tool> {
        if let Some(server) = &self.server {
            match server.list_tools().await {
                Ok(tools) => tools,
                Err(e) => {
                    warn!("Failed to list tools from MCP server: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        }
    }

    async fn execute_tool(&self, name: &str, arguments: serde_json::Value) -> Result<String, String> {
        if let Some(server) = &self.server {
            server
                .call_tool(name.to_string(), arguments)
                .await
                .map_err(|e| e.to_string())
        } else {
            Err("No MCP server configured".to_string())
        }
    }

    /// Send a chat request with automatic tool execution.
    ///
    /// This method automatically handles the tool execution loop:
    /// - Sends request to the model with the server's tools
    /// - Executes any tool calls
    /// - Continues until no more tool calls or max iterations reached
    ///
    /// # Returns
    /// The response containing all new messages generated during the execution
    /// (including tool calls and results)
    pub async fn chat(&self, mut messages: Vec<Message>) -> Result<Response, ClientError> {
        debug!(
            "Starting agent chat loop with {} initial messages",
            messages.len()
        );

        let mut new_messages = Vec::new();
        let tools = self.tools().await;
        let mut total_usage = Usage {
            prompt_tokens: Some(0),
            completion_tokens: Some(0),
        };

        for iteration in 0..self.max_iterations {
            debug!("Agent iteration {}/{}", iteration + 1, self.max_iterations);

            let response = self.client.request(messages.clone(), tools.clone()).await?;
            if let Some(usage) = &response.usage {
                total_usage += usage.clone();
            }

            let mut tool_calls_executed = false;

            for msg in response.data {
                messages.push(msg.clone());
                new_messages.push(msg.clone());

                for part in msg.parts() {
                    if let Part::FunctionCall { id, name, arguments } = part {
                        tool_calls_executed = true;
                        info!("Tool call requested: {}", name);
                        debug!("Tool arguments: {}", arguments);

                        let result = self.execute_tool(name, arguments.clone()).await;

                        let response_part = match result {
                            Ok(result) => {
                                info!("Tool {} executed successfully", name);
                                debug!("Tool result: {}", result);
                                Part::FunctionResponse {
                                    id: id.clone(),
                                    name: name.clone(),
                                    response: json!(result),
                                }
                            }
                            Err(e) => {
                                warn!("Tool {} execution failed: {}", name, e);
                                Part::FunctionResponse {
                                    id: id.clone(),
                                    name: name.clone(),
                                    response: json!({"error": e}),
                                }
                            }
                        };

                        let response_msg = Message::Tool(vec![response_part]);
                        messages.push(response_msg.clone());
                        new_messages.push(response_msg);
                    }
                }
            }

            if !tool_calls_executed {
                debug!("No more function calls, agent loop complete");
                return Ok(Response {
                    data: new_messages,
                    usage: Some(total_usage),
                    finish: response.finish,
                });
            }
        }

        warn!(
            "Max iterations ({}) reached in agent loop",
            self.max_iterations
        );
        Err(ClientError::Config(
            "Max iterations reached in agent loop".to_string(),
        ))
    }
}
