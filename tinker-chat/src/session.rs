//! Transcript accumulation around a [`ChatApi`].

use tinker_core::Message;

use crate::client::ChatApi;
use crate::error::ChatError;
use crate::transcript::Transcript;

/// Forward `history` to `api` and return the reply.
///
/// Appends nothing: the caller pushes the user message before and the reply
/// after. Failures propagate as-is; there is no retry.
pub fn send(history: &[Message], api: &dyn ChatApi, model: &str) -> Result<Message, ChatError> {
    let reply = api.complete(model, history)?;
    Ok(Message::assistant(reply.content))
}

/// One conversation: a transcript, the API it talks to, and the model name.
pub struct ChatSession<'a> {
    transcript: Transcript,
    api: &'a dyn ChatApi,
    model: String,
}

impl<'a> ChatSession<'a> {
    pub fn new(api: &'a dyn ChatApi, model: impl Into<String>, system_prompt: &str) -> Self {
        Self {
            transcript: Transcript::with_system(system_prompt),
            api,
            model: model.into(),
        }
    }

    /// Push `user_text`, send the whole transcript, push and return the reply.
    ///
    /// On error the user message stays in the transcript.
    pub fn turn(&mut self, user_text: &str) -> Result<&Message, ChatError> {
        self.transcript.push_user(user_text);
        let reply = send(self.transcript.messages(), self.api, &self.model)?;
        self.transcript.push_assistant(reply);
        self.transcript
            .last()
            .ok_or_else(|| ChatError::Upstream("transcript unexpectedly empty".to_string()))
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}
