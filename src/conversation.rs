//! Append-only conversation history.

use crate::model::{Message, Part, Role};
use serde_json::Value;
use uuid::Uuid;

/// The history of one chat, oldest message first.
///
/// Messages are only ever appended; the full history is sent with every
/// completion request.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: String,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
        }
    }

    /// Use `contact_id` as the conversation id, or generate one.
    pub fn for_contact(contact_id: Option<String>) -> Self {
        match contact_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => Self::new(id),
            None => Self::new(format!("convo-{}", Uuid::new_v4())),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Message::user(text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.push(Message::assistant(text));
    }

    /// Append content arriving from an external source with a loosely
    /// typed role. Structured content is stored as its JSON text.
    pub fn push_raw(&mut self, role: &str, content: &Value) {
        self.push(Message::new(
            Role::parse_lenient(role),
            vec![Part::from_value(content)],
        ));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
