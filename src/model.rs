//! Provider-agnostic conversation types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::{Add, AddAssign};

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl Role {
    /// Map a loosely spelled role name to a `Role`.
    ///
    /// Accepts the aliases other chat stacks emit (`bot`, `assistant_model`,
    /// `function`). Anything unrecognised is treated as user input.
    pub fn parse_lenient(role: &str) -> Self {
        match role.trim().to_lowercase().as_str() {
            "assistant" | "assistant_model" | "bot" => Role::Assistant,
            "system" => Role::System,
            "tool" | "function" => Role::Tool,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single piece of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Part {
    /// Plain text.
    Text(String),

    /// A tool invocation requested by the model.
    FunctionCall {
        id: Option<String>,
        name: String,
        arguments: Value,
    },

    /// The outcome of a tool invocation, sent back to the model.
    FunctionResponse {
        id: Option<String>,
        name: String,
        response: Value,
    },
}

impl Part {
    /// Build a text part from arbitrary JSON content.
    ///
    /// Strings are taken as-is, `null` becomes empty text and any other
    /// value is serialised.
    pub fn from_value(content: &Value) -> Self {
        match content {
            Value::String(s) => Part::Text(s.clone()),
            Value::Null => Part::Text(String::new()),
            other => Part::Text(other.to_string()),
        }
    }
}

/// A role-tagged list of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    User(Vec<Part>),
    Assistant(Vec<Part>),
    System(Vec<Part>),
    Tool(Vec<Part>),
}

impl Message {
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        match role {
            Role::User => Message::User(parts),
            Role::Assistant => Message::Assistant(parts),
            Role::System => Message::System(parts),
            Role::Tool => Message::Tool(parts),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Message::User(vec![Part::Text(text.into())])
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Message::Assistant(vec![Part::Text(text.into())])
    }

    pub fn system(text: impl Into<String>) -> Self {
        Message::System(vec![Part::Text(text.into())])
    }

    pub fn role(&self) -> Role {
        match self {
            Message::User(_) => Role::User,
            Message::Assistant(_) => Role::Assistant,
            Message::System(_) => Role::System,
            Message::Tool(_) => Role::Tool,
        }
    }

    pub fn parts(&self) -> &[Part] {
        match self {
            Message::User(parts)
            | Message::Assistant(parts)
            | Message::System(parts)
            | Message::Tool(parts) => parts,
        }
    }

    pub fn parts_mut(&mut self) -> &mut Vec<Part> {
        match self {
            Message::User(parts)
            | Message::Assistant(parts)
            | Message::System(parts)
            | Message::Tool(parts) => parts,
        }
    }

    /// Concatenated text of all text parts, if any.
    pub fn content(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts()
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        }
    }

    /// Whether the message carries at least one tool invocation.
    pub fn has_function_calls(&self) -> bool {
        self.parts()
            .iter()
            .any(|p| matches!(p, Part::FunctionCall { .. }))
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FinishReason {
    #[default]
    Stop,
    OutputTokens,
    ContentFilter,
    ToolCalls,
}

/// Token accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
}

fn add_counts(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        (a, None) => a,
        (None, b) => b,
    }
}

impl Add for Usage {
    type Output = Usage;

    fn add(self, rhs: Usage) -> Usage {
        Usage {
            prompt_tokens: add_counts(self.prompt_tokens, rhs.prompt_tokens),
            completion_tokens: add_counts(self.completion_tokens, rhs.completion_tokens),
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Usage) {
        *self = self.clone() + rhs;
    }
}

/// Result of a completion request (or of a full agent run).
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Messages produced, in order.
    pub data: Vec<Message>,
    pub usage: Option<Usage>,
    pub finish: FinishReason,
}

impl Response {
    /// Text of the last assistant message.
    pub fn text(&self) -> Option<String> {
        self.data
            .iter()
            .rev()
            .find(|m| m.role() == Role::Assistant)
            .and_then(Message::content)
    }
}
