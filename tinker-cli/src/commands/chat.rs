//! `tinker chat` — interactive session on stdin/stdout.

use std::io;

use anyhow::{Context, Result};
use clap::Args;

use tinker_chat::{repl, ChatSession, OpenAiClient};
use tinker_core::{config, secrets};

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Override `chat.model` for this session.
    #[arg(long)]
    pub model: Option<String>,
}

impl ChatArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config = config::load_at(&home).context("failed to load config")?;

        let provider = secrets::provider_from_config(&config.secrets, &home)
            .context("failed to set up secret provider")?;
        let client = OpenAiClient::from_config(&config.chat, provider.as_ref())
            .with_context(|| format!("failed to read API key '{}'", config.chat.api_key_secret))?;

        let model = self.model.unwrap_or_else(|| config.chat.model.clone());
        let mut session = ChatSession::new(&client, model, &config.chat.system_prompt);

        let stdin = io::stdin();
        repl::run(
            &mut session,
            &config.chat.assistant_label,
            stdin.lock(),
            io::stdout(),
        )
        .context("chat session failed")
    }
}
