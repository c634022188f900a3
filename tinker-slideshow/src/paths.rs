//! Runtime file locations under `~/.tinker/run/`.

use std::path::{Path, PathBuf};

use tinker_core::config::tinker_dir_at;

pub const SLIDESHOW_PID_FILE: &str = "slideshow.pid";

pub fn run_dir(home: &Path) -> PathBuf {
    tinker_dir_at(home).join("run")
}

pub fn pid_file_path(home: &Path) -> PathBuf {
    run_dir(home).join(SLIDESHOW_PID_FILE)
}
