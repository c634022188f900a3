//! Interactive read-eval loop over any line source.
//!
//! `exit` ends the loop and `json` dumps the transcript, both matched
//! case-insensitively. Every other line, empty ones included, is sent as a
//! user message. End of input behaves like `exit`.

use std::io::{BufRead, Write};

use crate::error::ChatError;
use crate::session::ChatSession;

pub const BANNER: &str =
    "ChatGPT CLI.\nType 'exit' to quit.\nType 'json' to see the conversation history.";

/// What a single input line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    DumpJson,
    Say(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.to_lowercase().as_str() {
            "exit" => Command::Exit,
            "json" => Command::DumpJson,
            _ => Command::Say(line.to_string()),
        }
    }
}

/// Run the loop until `exit` or end of input.
///
/// Chat errors end the loop and propagate to the caller.
pub fn run<R: BufRead, W: Write>(
    session: &mut ChatSession<'_>,
    assistant_label: &str,
    mut input: R,
    mut output: W,
) -> Result<(), ChatError> {
    writeln!(output, "{BANNER}")?;
    loop {
        write!(output, "\nYou: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }
        let line = line.trim_end_matches(['\n', '\r']);

        match Command::parse(line) {
            Command::Exit => break,
            Command::DumpJson => {
                for entry in session.transcript().to_json_lines()? {
                    writeln!(output, "{entry}")?;
                }
            }
            Command::Say(text) => {
                let reply = session.turn(&text)?;
                writeln!(output, "\n{assistant_label}: {}", reply.content)?;
            }
        }
    }
    Ok(())
}
