#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use tempfile::TempDir;
use tinker_core::config::SlideshowConfig;
use tinker_slideshow::{paths::pid_file_path, Launch, ProcessSlideshow, Slideshow, Termination};

fn sleeper() -> SlideshowConfig {
    SlideshowConfig {
        program: "sleep".to_string(),
        args: vec!["30".to_string()],
        detach: true,
    }
}

fn alive(pid: u32) -> bool {
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn detached_pid(launch: Launch) -> u32 {
    match launch {
        Launch::Detached { pid } => pid,
        other => panic!("expected detached launch, got {other:?}"),
    }
}

#[test]
fn restart_replaces_previous_process() {
    let home = TempDir::new().expect("home");
    let photos = TempDir::new().expect("photos");
    let mut slideshow = ProcessSlideshow::from_config_at(&sleeper(), home.path());

    let first = detached_pid(slideshow.restart(photos.path()).expect("first launch"));
    let recorded = fs::read_to_string(pid_file_path(home.path())).expect("pid file");
    assert_eq!(recorded.trim(), first.to_string());
    assert!(alive(first));

    let second = detached_pid(slideshow.restart(photos.path()).expect("relaunch"));
    assert_ne!(first, second);
    assert!(!alive(first), "previous slideshow must be gone");
    assert_eq!(slideshow.running_pid().expect("running pid"), Some(second));

    assert_eq!(
        slideshow.stop().expect("stop"),
        Termination::Terminated { pid: second }
    );
    assert!(!alive(second));
    assert!(!pid_file_path(home.path()).exists());
}

/// Spawn `sh -c script` as if by an earlier run and record its pid. The
/// returned handle reaps it in the background so it cannot linger as a zombie.
fn record_earlier_run(home: &Path, script: &str) -> (u32, JoinHandle<ExitStatus>) {
    let mut earlier = Command::new("sh")
        .args(["-c", script])
        .spawn()
        .expect("spawn sh");
    let pid = earlier.id();
    let pid_file = pid_file_path(home);
    fs::create_dir_all(pid_file.parent().unwrap()).unwrap();
    fs::write(&pid_file, format!("{pid}\n")).unwrap();
    let reaper = std::thread::spawn(move || earlier.wait().expect("wait"));
    (pid, reaper)
}

#[test]
fn stop_uses_pid_recorded_by_an_earlier_run() {
    let home = TempDir::new().expect("home");
    let (pid, reaper) = record_earlier_run(home.path(), "exec sleep 30");

    let mut slideshow = ProcessSlideshow::from_config_at(&sleeper(), home.path());
    assert_eq!(slideshow.stop().expect("stop"), Termination::Terminated { pid });

    let status = reaper.join().expect("reaper");
    assert!(!status.success(), "sleep should have been signalled");
    assert!(!pid_file_path(home.path()).exists());
}

#[test]
fn process_ignoring_terminate_is_killed_before_relaunch() {
    let home = TempDir::new().expect("home");
    let photos = TempDir::new().expect("photos");
    let (stubborn, reaper) = record_earlier_run(home.path(), "trap '' TERM; exec sleep 30");

    let mut slideshow = ProcessSlideshow::from_config_at(&sleeper(), home.path());
    let fresh = detached_pid(slideshow.restart(photos.path()).expect("restart"));

    let status = reaper.join().expect("reaper");
    assert!(!status.success());
    assert!(!alive(stubborn), "old slideshow must not survive a restart");
    assert_ne!(fresh, stubborn);
    assert_eq!(slideshow.running_pid().expect("running pid"), Some(fresh));

    slideshow.stop().expect("stop");
}

#[test]
fn stale_pid_file_is_cleared_without_error() {
    let home = TempDir::new().expect("home");
    let mut gone = Command::new("true").spawn().expect("spawn true");
    let pid = gone.id();
    gone.wait().expect("wait");

    let pid_file = pid_file_path(home.path());
    fs::create_dir_all(pid_file.parent().unwrap()).unwrap();
    fs::write(&pid_file, format!("{pid}\n")).unwrap();

    let mut slideshow = ProcessSlideshow::from_config_at(&sleeper(), home.path());
    assert_eq!(slideshow.stop().expect("stop"), Termination::NotRunning);
    assert!(!pid_file.exists());
}
