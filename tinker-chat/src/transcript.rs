//! Ordered, append-only transcript of one chat session.
//!
//! The only constructor seeds the system prompt, and there is no API to
//! remove or reorder entries, so it stays first for the life of the session.

use tinker_core::{Message, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// A transcript seeded with a system prompt.
    pub fn with_system(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(prompt)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Append a reply. The role is forced to `Assistant`.
    pub fn push_assistant(&mut self, reply: Message) {
        self.messages.push(Message {
            role: Role::Assistant,
            content: reply.content,
        });
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// One JSON object per entry, in order.
    pub fn to_json_lines(&self) -> Result<Vec<String>, serde_json::Error> {
        self.messages.iter().map(serde_json::to_string).collect()
    }
}
