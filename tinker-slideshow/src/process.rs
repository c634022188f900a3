//! Slideshow process lifecycle.
//!
//! The launched process is identified by the pid recorded at launch time
//! (`~/.tinker/run/slideshow.pid`), never by scanning the process table. A
//! process launched by this very run is also held as a [`Child`] so it can
//! be killed and reaped directly.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::sleep;
use std::time::Duration;

use tinker_core::config::SlideshowConfig;

use crate::error::{io_err, SlideshowError};
use crate::paths::pid_file_path;

/// Placeholder in `slideshow.args` replaced by the photo directory.
pub const DIR_PLACEHOLDER: &str = "{dir}";

/// How long to wait for a signalled process to disappear.
const EXIT_POLL_ATTEMPTS: u32 = 40;
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Something that shows the photos in a directory.
pub trait Slideshow {
    /// Stop the current instance (if any) and start a new one on `dir`.
    fn restart(&mut self, dir: &Path) -> Result<Launch, SlideshowError>;
    /// Stop the current instance; a no-op if none is running.
    fn stop(&mut self) -> Result<Termination, SlideshowError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Terminated { pid: u32 },
    NotRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// Running in the background under this pid.
    Detached { pid: u32 },
    /// Ran in the foreground and has exited successfully.
    Foreground,
}

/// A slideshow program run as a child process.
pub struct ProcessSlideshow {
    program: String,
    args: Vec<String>,
    detach: bool,
    pid_file: PathBuf,
    child: Option<Child>,
}

impl ProcessSlideshow {
    pub fn new(config: &SlideshowConfig, pid_file: impl Into<PathBuf>) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            detach: config.detach,
            pid_file: pid_file.into(),
            child: None,
        }
    }

    /// Pid file under `<home>/.tinker/run/`.
    pub fn from_config_at(config: &SlideshowConfig, home: &Path) -> Self {
        Self::new(config, pid_file_path(home))
    }

    pub fn pid_file(&self) -> &Path {
        &self.pid_file
    }

    /// Arguments with [`DIR_PLACEHOLDER`] substituted.
    pub fn command_args(&self, dir: &Path) -> Vec<String> {
        let dir = dir.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace(DIR_PLACEHOLDER, &dir))
            .collect()
    }

    /// Pid recorded by the last detached launch, if any.
    pub fn recorded_pid(&self) -> Result<Option<u32>, SlideshowError> {
        if !self.pid_file.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.pid_file).map_err(|e| io_err(&self.pid_file, e))?;
        content
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SlideshowError::PidFile {
                path: self.pid_file.clone(),
                content,
            })
    }

    /// Recorded pid, only if that process is still alive.
    pub fn running_pid(&self) -> Result<Option<u32>, SlideshowError> {
        Ok(self.recorded_pid()?.filter(|pid| process_alive(*pid)))
    }

    fn terminate(&mut self) -> Result<Termination, SlideshowError> {
        if let Some(mut child) = self.child.take() {
            let pid = child.id();
            // Already-exited children make kill() fail; wait() still reaps them.
            let _ = child.kill();
            child.wait().map_err(|e| io_err(&self.pid_file, e))?;
            self.clear_pid_file()?;
            tracing::info!(pid, "stopped slideshow");
            return Ok(Termination::Terminated { pid });
        }

        let Some(pid) = self.recorded_pid()? else {
            return Ok(Termination::NotRunning);
        };
        if !process_alive(pid) {
            tracing::debug!(pid, "recorded slideshow already gone");
            self.clear_pid_file()?;
            return Ok(Termination::NotRunning);
        }

        send_terminate(pid);
        if !wait_for_exit(pid) {
            tracing::warn!(pid, "slideshow ignored terminate; killing");
            send_kill(pid);
            if !wait_for_exit(pid) {
                // Keep the pid file: it is the only handle left on the survivor.
                return Err(SlideshowError::StillRunning { pid });
            }
        }
        self.clear_pid_file()?;
        tracing::info!(pid, "stopped slideshow");
        Ok(Termination::Terminated { pid })
    }

    fn launch(&mut self, dir: &Path) -> Result<Launch, SlideshowError> {
        let mut command = Command::new(&self.program);
        command.args(self.command_args(dir));

        if !self.detach {
            let status = command.status().map_err(|source| SlideshowError::Launch {
                program: self.program.clone(),
                source,
            })?;
            if !status.success() {
                return Err(SlideshowError::Exited { status });
            }
            return Ok(Launch::Foreground);
        }

        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach_from_caller(&mut command);

        let child = command.spawn().map_err(|source| SlideshowError::Launch {
            program: self.program.clone(),
            source,
        })?;
        let pid = child.id();
        self.child = Some(child);
        self.write_pid_file(pid)?;
        tracing::info!(pid, program = %self.program, "launched slideshow");
        Ok(Launch::Detached { pid })
    }

    /// Atomic: `.tmp` sibling then rename.
    fn write_pid_file(&self, pid: u32) -> Result<(), SlideshowError> {
        if let Some(dir) = self.pid_file.parent() {
            fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
        let tmp = self.pid_file.with_extension("pid.tmp");
        fs::write(&tmp, format!("{pid}\n")).map_err(|e| io_err(&tmp, e))?;
        fs::rename(&tmp, &self.pid_file).map_err(|e| io_err(&self.pid_file, e))
    }

    fn clear_pid_file(&self) -> Result<(), SlideshowError> {
        match fs::remove_file(&self.pid_file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(&self.pid_file, e)),
        }
    }
}

impl Slideshow for ProcessSlideshow {
    fn restart(&mut self, dir: &Path) -> Result<Launch, SlideshowError> {
        self.terminate()?;
        self.launch(dir)
    }

    fn stop(&mut self) -> Result<Termination, SlideshowError> {
        self.terminate()
    }
}

// ---------------------------------------------------------------------------
// Platform helpers
// ---------------------------------------------------------------------------

/// Poll until `pid` is gone; false if it outlived the poll.
fn wait_for_exit(pid: u32) -> bool {
    for _ in 0..EXIT_POLL_ATTEMPTS {
        if !process_alive(pid) {
            return true;
        }
        sleep(EXIT_POLL_INTERVAL);
    }
    !process_alive(pid)
}

#[cfg(unix)]
fn detach_from_caller(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn detach_from_caller(_command: &mut Command) {}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn process_alive(pid: u32) -> bool {
    Command::new("tasklist")
        .args(["/FI", &format!("PID eq {pid}"), "/NH"])
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).contains(&pid.to_string()))
        .unwrap_or(false)
}

/// Best effort; a process that vanished in between is fine.
#[cfg(unix)]
fn send_terminate(pid: u32) {
    let _ = Command::new("kill")
        .arg(pid.to_string())
        .stderr(Stdio::null())
        .status();
}

#[cfg(unix)]
fn send_kill(pid: u32) {
    let _ = Command::new("kill")
        .args(["-KILL", &pid.to_string()])
        .stderr(Stdio::null())
        .status();
}

#[cfg(not(unix))]
fn send_kill(pid: u32) {
    send_terminate(pid);
}

#[cfg(not(unix))]
fn send_terminate(pid: u32) {
    let _ = Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/F"])
        .stderr(Stdio::null())
        .status();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(program: &str, args: &[&str], detach: bool) -> SlideshowConfig {
        SlideshowConfig {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            detach,
        }
    }

    #[test]
    fn dir_placeholder_is_substituted() {
        let slideshow = ProcessSlideshow::new(
            &config("feh", &["--quiet", "{dir}", "--title={dir}"], true),
            "/tmp/unused.pid",
        );
        assert_eq!(
            slideshow.command_args(Path::new("/home/pi/photos")),
            vec!["--quiet", "/home/pi/photos", "--title=/home/pi/photos"]
        );
    }

    #[test]
    fn stop_without_pid_file_is_noop() {
        let home = TempDir::new().unwrap();
        let mut slideshow =
            ProcessSlideshow::from_config_at(&SlideshowConfig::default(), home.path());
        assert_eq!(slideshow.stop().unwrap(), Termination::NotRunning);
    }

    #[test]
    fn corrupt_pid_file_is_reported() {
        let home = TempDir::new().unwrap();
        let pid_file = pid_file_path(home.path());
        fs::create_dir_all(pid_file.parent().unwrap()).unwrap();
        fs::write(&pid_file, "feh\n").unwrap();

        let slideshow = ProcessSlideshow::new(&SlideshowConfig::default(), &pid_file);
        assert!(matches!(
            slideshow.recorded_pid(),
            Err(SlideshowError::PidFile { .. })
        ));
    }

    #[test]
    fn missing_program_is_launch_error() {
        let home = TempDir::new().unwrap();
        let mut slideshow = ProcessSlideshow::from_config_at(
            &config("tinker-definitely-not-a-program", &[], true),
            home.path(),
        );
        let err = slideshow.restart(home.path()).unwrap_err();
        assert!(matches!(err, SlideshowError::Launch { .. }), "got: {err}");
        assert!(!slideshow.pid_file().exists());
    }

    #[test]
    #[cfg(unix)]
    fn foreground_launch_waits_and_records_nothing() {
        let home = TempDir::new().unwrap();
        let mut ok = ProcessSlideshow::from_config_at(&config("true", &[], false), home.path());
        assert_eq!(ok.restart(home.path()).unwrap(), Launch::Foreground);
        assert!(!ok.pid_file().exists());

        let mut failing =
            ProcessSlideshow::from_config_at(&config("false", &[], false), home.path());
        assert!(matches!(
            failing.restart(home.path()),
            Err(SlideshowError::Exited { .. })
        ));
    }
}
