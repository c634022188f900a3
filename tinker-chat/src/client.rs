//! Chat-completions client.
//!
//! [`ChatApi`] is the seam the session talks to; [`OpenAiClient`] speaks the
//! OpenAI-compatible `POST /chat/completions` wire format over `ureq`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use tinker_core::{config::ChatConfig, Message, SecretProvider};

use crate::error::ChatError;

/// Sends a whole message list and returns the model's reply.
pub trait ChatApi {
    fn complete(&self, model: &str, messages: &[Message]) -> Result<Message, ChatError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Extract `choices[0].message.content` from a completion body.
pub fn parse_completion(body: &str) -> Result<Message, ChatError> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| ChatError::Upstream(format!("malformed completion body: {e}")))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ChatError::Upstream("completion contained no choices".to_string()))?;
    Ok(Message::assistant(choice.message.content.unwrap_or_default()))
}

/// Blocking OpenAI-compatible client.
pub struct OpenAiClient {
    endpoint: String,
    api_key: String,
    agent: ureq::Agent,
}

impl OpenAiClient {
    pub fn new(api_base: &str, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            api_key: api_key.into(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Resolve `chat.api_key_secret` through `secrets` and build the client.
    pub fn from_config(
        config: &ChatConfig,
        secrets: &dyn SecretProvider,
    ) -> Result<Self, ChatError> {
        let api_key = secrets.get_secret(&config.api_key_secret)?;
        Ok(Self::new(
            &config.api_base,
            api_key,
            Duration::from_secs(config.timeout_secs),
        ))
    }
}

impl ChatApi for OpenAiClient {
    fn complete(&self, model: &str, messages: &[Message]) -> Result<Message, ChatError> {
        tracing::debug!(model, messages = messages.len(), "requesting completion");
        let response = self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(CompletionRequest { model, messages });

        match response {
            Ok(response) => {
                let body = response
                    .into_string()
                    .map_err(|e| ChatError::Upstream(format!("failed to read body: {e}")))?;
                parse_completion(&body)
            }
            Err(ureq::Error::Status(429, response)) => Err(ChatError::RateLimited(
                response.into_string().unwrap_or_default(),
            )),
            Err(ureq::Error::Status(code, response)) => Err(ChatError::Upstream(format!(
                "HTTP {code}: {}",
                response.into_string().unwrap_or_default().trim()
            ))),
            Err(ureq::Error::Transport(t)) => Err(ChatError::Upstream(t.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinker_core::testing::serve_once;
    use tinker_core::Role;

    #[test]
    fn parse_completion_takes_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Fine."}},{"message":{"content":"ignored"}}]}"#;
        let reply = parse_completion(body).unwrap();
        assert_eq!(reply, Message::assistant("Fine."));
    }

    #[test]
    fn parse_completion_without_choices_is_upstream_error() {
        let err = parse_completion(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, ChatError::Upstream(_)), "got: {err}");
        let err = parse_completion("not json").unwrap_err();
        assert!(matches!(err, ChatError::Upstream(_)), "got: {err}");
    }

    #[test]
    fn complete_posts_full_history() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"What now?"}}]}"#,
        );
        let client = OpenAiClient::new(&url, "sk-test", Duration::from_secs(5));
        let history = vec![Message::system("be cranky"), Message::user("hi")];

        let reply = client.complete("gpt-3.5-turbo", &history).unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "What now?");

        let sent: serde_json::Value = serde_json::from_str(&server.join().unwrap().body).unwrap();
        assert_eq!(sent["model"], "gpt-3.5-turbo");
        assert_eq!(sent["messages"][0]["role"], "system");
        assert_eq!(sent["messages"][1]["content"], "hi");
    }

    #[test]
    fn complete_maps_429_to_rate_limited() {
        let (url, server) = serve_once("429 Too Many Requests", r#"{"error":"slow down"}"#);
        let client = OpenAiClient::new(&url, "sk-test", Duration::from_secs(5));
        let err = client
            .complete("gpt-3.5-turbo", &[Message::user("hi")])
            .unwrap_err();
        assert!(matches!(err, ChatError::RateLimited(_)), "got: {err}");
        server.join().unwrap();
    }

    #[test]
    fn complete_maps_500_to_upstream() {
        let (url, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#);
        let client = OpenAiClient::new(&url, "sk-test", Duration::from_secs(5));
        let err = client
            .complete("gpt-3.5-turbo", &[Message::user("hi")])
            .unwrap_err();
        assert!(matches!(err, ChatError::Upstream(ref m) if m.contains("500")), "got: {err}");
        server.join().unwrap();
    }
}
