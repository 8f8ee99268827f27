//! OpenAI Chat Completions API client implementation.
//!
//! The same wire format is served by OpenAI itself and by Azure OpenAI
//! deployments; only the URL layout and the auth header differ.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{Client, ClientError};
use crate::http::{add_extra_headers, build_http_client, RequestBuilderExt, ResponseExt};
use crate::model::{FinishReason, Message, Part, Response, Usage};
use crate::options::{ModelOptions, TransportOptions};

/// Trait for models compatible with OpenAI's Chat Completions API.
pub trait OpenAiCompatibleModel:
    Send + Sync + Default + Serialize + for<'de> Deserialize<'de> + Clone
{
}

/// Where chat completion requests are sent and how they authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEndpoint {
    /// `{base_url}/chat/completions` with a bearer token.
    OpenAi { base_url: String },
    /// `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version=..`
    /// with an `api-key` header.
    Azure {
        endpoint: String,
        deployment: String,
        api_version: String,
    },
}

impl ChatEndpoint {
    pub fn url(&self) -> String {
        match self {
            ChatEndpoint::OpenAi { base_url } => {
                format!("{}/chat/completions", base_url.trim_end_matches('/'))
            }
            ChatEndpoint::Azure {
                endpoint,
                deployment,
                api_version,
            } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                endpoint.trim_end_matches('/'),
                deployment,
                api_version
            ),
        }
    }

    fn is_azure(&self) -> bool {
        matches!(self, ChatEndpoint::Azure { .. })
    }
}

/// Generic client for OpenAI-compatible Chat Completions APIs.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient<M> {
    api_key: String,
    endpoint: ChatEndpoint,
    model_options: ModelOptions<M>,
    transport_options: TransportOptions,
}

impl<M: OpenAiCompatibleModel> OpenAiCompatibleClient<M> {
    /// Create a new client.
    pub fn new(
        api_key: String,
        endpoint: ChatEndpoint,
        model_options: ModelOptions<M>,
        transport_options: TransportOptions,
    ) -> Self {
        Self {
            api_key,
            endpoint,
            model_options,
            transport_options,
        }
    }

    pub fn endpoint(&self) -> &ChatEndpoint {
        &self.endpoint
    }

    /// Handle error responses.
    fn handle_error_response(status: reqwest::StatusCode, body: &str) -> ClientError {
        if let Ok(error_resp) = serde_json::from_str::<ChatErrorResponse>(body) {
            ClientError::ProviderError(format!(
                "API error ({}): {}",
                error_resp.error.error_type.unwrap_or_else(|| status.to_string()),
                error_resp.error.message
            ))
        } else {
            ClientError::ProviderError(format!("HTTP {}: {}", status, body))
        }
    }
}

#[async_trait]
impl<M: OpenAiCompatibleModel> Client for OpenAiCompatibleClient<M> {
    type ModelProvider = M;

    async fn request(
        &self,
        messages: Vec<Message>,
        tools: Vec<rmcp::model::Tool>,
    ) -> Result<Response, ClientError> {
        let url = self.endpoint.url();

        // Azure picks the model from the deployment in the URL
        let model = if self.endpoint.is_azure() {
            None
        } else {
            Some(self.model_options.model.clone().ok_or_else(|| {
                ClientError::Config("Model must be specified".to_string())
            })?)
        };

        let request_body = ChatRequest::new(messages, &self.model_options, model, tools);

        let http_client = build_http_client(&self.transport_options)?;

        let mut req = http_client.post(&url).header(CONTENT_TYPE, "application/json");
        req = match &self.endpoint {
            ChatEndpoint::OpenAi { .. } => {
                req.header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            }
            ChatEndpoint::Azure { .. } => req.header("api-key", &self.api_key),
        };
        req = add_extra_headers(req, &self.transport_options);

        let response = req.json_logged(&request_body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text_logged().await.unwrap_or_default();
            return Err(Self::handle_error_response(status, &body));
        }

        let chat_response: ChatResponse = response.json_logged::<_, ClientError>().await?;
        Ok(chat_response.into())
    }

    fn model_options(&self) -> &ModelOptions<Self::ModelProvider> {
        &self.model_options
    }

    fn transport_options(&self) -> &TransportOptions {
        &self.transport_options
    }
}

impl<M: OpenAiCompatibleModel + Clone> ChatRequest<M> {
    fn new(
        messages_in: Vec<Message>,
        model_options: &ModelOptions<M>,
        model: Option<String>,
        tool_defs: Vec<rmcp::model::Tool>,
    ) -> Self {
        let mut messages: Vec<ChatMessage> = Vec::with_capacity(messages_in.len() + 1);
        if let Some(system) = &model_options.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }
        messages.extend(messages_in.into_iter().map(ChatMessage::from));

        let tools = if tool_defs.is_empty() {
            None
        } else {
            Some(
                tool_defs
                    .iter()
                    .map(|def| ChatTool {
                        tool_type: "function".to_string(),
                        function: ChatFunction {
                            name: def.name.to_string(),
                            description: def.description.as_ref().map(|d| d.to_string()),
                            parameters: Value::Object((*def.input_schema).clone()),
                        },
                    })
                    .collect(),
            )
        };

        ChatRequest {
            model,
            messages,
            temperature: model_options.temperature,
            top_p: model_options.top_p,
            max_tokens: model_options.max_tokens,
            tools,
            provider_options: model_options.provider.clone(),
        }
    }
}

impl From<Message> for ChatMessage {
    fn from(msg: Message) -> Self {
        let role = msg.role().as_str();

        let mut content_parts = Vec::new();
        let mut tool_calls = Vec::new();
        let mut tool_call_id = None;

        for part in msg.parts() {
            match part {
                Part::Text(text) => content_parts.push(text.clone()),
                Part::FunctionCall { id, name, arguments } => {
                    tool_calls.push(ChatToolCall {
                        id: id.clone().unwrap_or_else(|| "call_unknown".to_string()),
                        tool_type: "function".to_string(),
                        function: ChatFunctionCall {
                            name: name.clone(),
                            arguments: match arguments {
                                Value::String(s) => s.clone(),
                                _ => arguments.to_string(),
                            },
                        },
                    });
                }
                Part::FunctionResponse { id, response, .. } => {
                    content_parts.push(match response {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                    tool_call_id = id.clone();
                }
            }
        }

        let final_role = if tool_call_id.is_some() { "tool" } else { role };

        ChatMessage {
            role: final_role.to_string(),
            content: if content_parts.is_empty() { None } else { Some(content_parts.join("\n")) },
            tool_calls: if tool_calls.is_empty() { None } else { Some(tool_calls) },
            tool_call_id,
        }
    }
}

impl From<ChatMessage> for Message {
    fn from(msg: ChatMessage) -> Self {
        let mut parts = Vec::new();

        if let Some(content) = msg.content {
            parts.push(Part::Text(content));
        }

        if let Some(tool_calls) = msg.tool_calls {
            for tool_call in tool_calls {
                parts.push(Part::FunctionCall {
                    id: Some(tool_call.id),
                    name: tool_call.function.name,
                    arguments: serde_json::from_str(&tool_call.function.arguments)
                        .unwrap_or(Value::Null),
                });
            }
        }

        Message::new(crate::model::Role::parse_lenient(&msg.role), parts)
    }
}

fn finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::OutputTokens,
        "content_filter" => FinishReason::ContentFilter,
        "tool_calls" | "function_call" => FinishReason::ToolCalls,
        _ => FinishReason::Stop,
    }
}

impl From<ChatResponse> for Response {
    fn from(chat_resp: ChatResponse) -> Self {
        let finish = chat_resp
            .choices
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .map(finish_reason)
            .unwrap_or(FinishReason::Stop);

        // n defaults to 1, so only the first choice is the reply
        let messages = chat_resp
            .choices
            .into_iter()
            .take(1)
            .map(|choice| choice.message.into())
            .collect();

        Response {
            data: messages,
            usage: chat_resp.usage.map(|u| Usage {
                prompt_tokens: Some(u.prompt_tokens),
                completion_tokens: Some(u.completion_tokens),
            }),
            finish,
        }
    }
}

// --- Chat Completions API Types ---

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
struct ChatRequest<M> {
    model: Option<String>,
    messages: Vec<ChatMessage>,
    temperature: Option<f32>,
    top_p: Option<f32>,
    max_tokens: Option<u32>,
    tools: Option<Vec<ChatTool>>,
    #[serde(flatten)]
    provider_options: M,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
    tool_calls: Option<Vec<ChatToolCall>>,
    tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatToolCall {
    id: String,
    #[serde(rename = "type")]
    tool_type: String,
    function: ChatFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: ChatFunction,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
struct ChatFunction {
    name: String,
    description: Option<String>,
    parameters: Value,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatErrorResponse {
    error: ChatError,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatError {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize, Default)]
    struct TestModel;

    impl OpenAiCompatibleModel for TestModel {}

    #[test]
    fn test_endpoint_urls() {
        let openai = ChatEndpoint::OpenAi {
            base_url: "https://api.openai.com/v1/".to_string(),
        };
        assert_eq!(openai.url(), "https://api.openai.com/v1/chat/completions");

        let azure = ChatEndpoint::Azure {
            endpoint: "https://example.openai.azure.com".to_string(),
            deployment: "gpt4o".to_string(),
            api_version: "2024-10-21".to_string(),
        };
        assert_eq!(
            azure.url(),
            "https://example.openai.azure.com/openai/deployments/gpt4o/chat/completions?api-version=2024-10-21"
        );
    }

    #[test]
    fn test_request_prepends_system_and_maps_tool_results() {
        let options = ModelOptions::<TestModel>::new("gpt-4o-mini").with_system("be brief");
        let messages = vec![
            Message::user("what time is it?"),
            Message::Assistant(vec![Part::FunctionCall {
                id: Some("call_1".to_string()),
                name: "get_date_time".to_string(),
                arguments: json!({}),
            }]),
            Message::Tool(vec![Part::FunctionResponse {
                id: Some("call_1".to_string()),
                name: "get_date_time".to_string(),
                response: json!("2024-01-01 12:00:00"),
            }]),
        ];

        let request = ChatRequest::new(messages, &options, Some("gpt-4o-mini".into()), vec![]);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert!(body.get("tools").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be brief");
        assert_eq!(body["messages"][2]["tool_calls"][0]["function"]["arguments"], "{}");
        assert_eq!(body["messages"][3]["role"], "tool");
        assert_eq!(body["messages"][3]["tool_call_id"], "call_1");
        assert_eq!(body["messages"][3]["content"], "2024-01-01 12:00:00");
    }

    #[test]
    fn test_azure_request_omits_model() {
        let options = ModelOptions::<TestModel>::default();
        let request = ChatRequest::new(vec![Message::user("hi")], &options, None, vec![]);
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("model").is_none());
    }

    #[test]
    fn test_response_with_tool_calls() {
        let raw = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "weather_info", "arguments": "{\"location\":\"Paris\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        });
        let chat: ChatResponse = serde_json::from_value(raw).unwrap();
        let response: Response = chat.into();

        assert_eq!(response.finish, FinishReason::ToolCalls);
        assert_eq!(response.usage.unwrap().prompt_tokens, Some(12));
        assert_eq!(
            response.data,
            vec![Message::Assistant(vec![Part::FunctionCall {
                id: Some("call_9".to_string()),
                name: "weather_info".to_string(),
                arguments: json!({"location": "Paris"}),
            }])]
        );
    }
}
