use std::cell::Cell;

use tinker_chat::{send, ChatApi, ChatError, ChatSession, OpenAiClient};
use tinker_core::{config::ChatConfig, secrets::FileSecrets, Message, Role, SecretError};

struct CannedApi {
    calls: Cell<usize>,
}

impl ChatApi for CannedApi {
    fn complete(&self, model: &str, messages: &[Message]) -> Result<Message, ChatError> {
        self.calls.set(self.calls.get() + 1);
        assert_eq!(model, "gpt-3.5-turbo");
        assert_eq!(messages[0].role, Role::System);
        Ok(Message::assistant("Ugh. Hello."))
    }
}

#[test]
fn send_then_append_gives_system_user_assistant() {
    let api = CannedApi { calls: Cell::new(0) };
    let mut history = vec![
        Message::system("You are a helpful but cranky assistant."),
        Message::user("hi"),
    ];

    let reply = send(&history, &api, "gpt-3.5-turbo").expect("send");
    history.push(reply);

    assert_eq!(history.len(), 3);
    let roles: Vec<Role> = history.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    assert_eq!(api.calls.get(), 1);
}

#[test]
fn session_uses_configured_system_prompt() {
    let api = CannedApi { calls: Cell::new(0) };
    let config = ChatConfig::default();
    let mut session = ChatSession::new(&api, config.model.clone(), &config.system_prompt);
    let reply = session.turn("hi").expect("turn");
    assert_eq!(reply.content, "Ugh. Hello.");
    assert_eq!(
        session.transcript().messages()[0].content,
        "You are a helpful but cranky assistant."
    );
}

#[test]
fn client_from_config_fails_without_secret() {
    let tmp = tempfile::TempDir::new().expect("tempdir");
    let secrets = FileSecrets::new(tmp.path().join("secrets.yaml"));
    let err = OpenAiClient::from_config(&ChatConfig::default(), &secrets)
        .err()
        .expect("missing secret must fail");
    assert!(
        matches!(err, ChatError::Secret(SecretError::NotFound { ref name }) if name == "OpenAIKey"),
        "got: {err}"
    );
}
