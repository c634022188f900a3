//! # tinker-chat
//!
//! Flat-transcript chat against an OpenAI-compatible API.
//!
//! Build an [`OpenAiClient`] from config and a secret provider, wrap it in a
//! [`ChatSession`], and drive it with [`repl::run`].

pub mod client;
pub mod error;
pub mod repl;
pub mod session;
pub mod transcript;

pub use client::{ChatApi, OpenAiClient};
pub use error::ChatError;
pub use session::{send, ChatSession};
pub use transcript::Transcript;
