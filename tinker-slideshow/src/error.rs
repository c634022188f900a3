//! Errors raised while launching or stopping the slideshow.

use std::path::PathBuf;

use thiserror::Error;

/// Error surface for slideshow process control.
#[derive(Debug, Error)]
pub enum SlideshowError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("slideshow exited with {status}")]
    Exited { status: std::process::ExitStatus },

    #[error("slideshow (pid {pid}) survived kill; pid file kept")]
    StillRunning { pid: u32 },

    #[error("corrupt pid file {path}: {content:?}")]
    PidFile { path: PathBuf, content: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SlideshowError {
    SlideshowError::Io {
        path: path.into(),
        source,
    }
}
