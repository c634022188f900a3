//! tinker — chat with an OpenAI-style model and keep a photo frame in sync.
//!
//! # Usage
//!
//! ```text
//! tinker init [--force]
//! tinker chat
//! tinker frame sync [--dry-run] [--no-restart]
//! tinker frame status [--json]
//! tinker frame restart|stop
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{chat::ChatArgs, frame::FrameCommand, init::InitArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tinker",
    version,
    about = "Terminal chat client and photo-frame mirror",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the default config to ~/.tinker/config.yaml.
    Init(InitArgs),

    /// Start an interactive chat session.
    Chat(ChatArgs),

    /// Mirror a remote photo album and drive the slideshow.
    Frame {
        #[command(subcommand)]
        command: FrameCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Chat(args) => args.run(),
        Commands::Frame { command } => commands::frame::run(command),
    }
}

/// Logs go to stderr so stdout stays clean for chat output.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
