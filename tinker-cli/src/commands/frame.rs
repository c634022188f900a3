//! `tinker frame` — album mirror and slideshow control.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use tinker_core::{config, secrets, Config};
use tinker_mirror::{
    pipeline, FlickrSource, HttpDownloader, LocalMirror, SyncAction, SyncOptions, SyncReport,
};
use tinker_slideshow::{Launch, ProcessSlideshow, Slideshow, Termination};

#[derive(Subcommand, Debug)]
pub enum FrameCommand {
    /// Mirror the configured album into the photo directory.
    Sync(SyncArgs),
    /// Show mirrored photos and whether the slideshow is running.
    Status(StatusArgs),
    /// Restart the slideshow on the photo directory.
    Restart,
    /// Stop the slideshow.
    Stop,
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Report what would change without downloading or deleting anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Leave the slideshow alone even if photos changed.
    #[arg(long)]
    pub no_restart: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(command: FrameCommand) -> Result<()> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    let config = config::load_at(&home).context("failed to load config")?;

    match command {
        FrameCommand::Sync(args) => args.run(&home, &config),
        FrameCommand::Status(args) => args.run(&home, &config),
        FrameCommand::Restart => {
            let dir = config.frame.photos_dir_at(&home);
            restart_slideshow(&home, &config, &dir)
        }
        FrameCommand::Stop => {
            let mut slideshow = ProcessSlideshow::from_config_at(&config.slideshow, &home);
            match slideshow.stop().context("failed to stop slideshow")? {
                Termination::Terminated { pid } => println!("stopped slideshow (pid {pid})"),
                Termination::NotRunning => println!("slideshow is not running"),
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// sync
// ---------------------------------------------------------------------------

impl SyncArgs {
    fn run(self, home: &Path, config: &Config) -> Result<()> {
        let frame = &config.frame;
        if frame.photoset_id.trim().is_empty() {
            bail!(
                "frame.photoset_id is not set in {}",
                config::path_at(home).display()
            );
        }

        let provider = secrets::provider_from_config(&config.secrets, home)
            .context("failed to set up secret provider")?;
        let source = FlickrSource::from_config(frame, provider.as_ref())
            .with_context(|| format!("failed to read API key '{}'", frame.api_key_secret))?;
        let downloader = HttpDownloader::new(Duration::from_secs(frame.timeout_secs));
        let dir = frame.photos_dir_at(home);
        let mirror = LocalMirror::open(&dir)
            .with_context(|| format!("cannot open photo directory {}", dir.display()))?;
        let options = SyncOptions::from_config(frame, self.dry_run);

        println!(" ---> Requesting photos...");
        let report = pipeline::run(&source, &downloader, &mirror, &options)
            .with_context(|| format!("sync failed for photoset '{}'", frame.photoset_id))?;
        print_report(&report, self.dry_run);

        if !report.changed() {
            return Ok(());
        }
        if self.no_restart {
            println!(" ---> Photos changed; slideshow left running (--no-restart)");
            return Ok(());
        }
        restart_slideshow(home, config, mirror.dir())
    }
}

fn print_report(report: &SyncReport, dry_run: bool) {
    for action in &report.actions {
        match action {
            SyncAction::Present { name } => {
                println!(" ---> {} {name}", "Already have".bright_black())
            }
            SyncAction::Fetched { url, .. } => println!(" ---> {} {url}", "Downloading".green()),
            SyncAction::Deleted { name } => println!(" ---> {} {name}", "Deleting".red()),
            SyncAction::WouldFetch { url, .. } => {
                println!(" ---> [dry-run] {} {url}", "Would download".green())
            }
            SyncAction::WouldDelete { name } => {
                println!(" ---> [dry-run] {} {name}", "Would delete".red())
            }
            SyncAction::Failed { name, reason } => {
                println!(" ---> {} {name}: {reason}", "Failed".yellow())
            }
        }
    }

    let fetched = report.count(|a| {
        matches!(
            a,
            SyncAction::Fetched { .. } | SyncAction::WouldFetch { .. }
        )
    });
    let deleted = report.count(|a| {
        matches!(
            a,
            SyncAction::Deleted { .. } | SyncAction::WouldDelete { .. }
        )
    });
    let failed = report.count(|a| matches!(a, SyncAction::Failed { .. }));
    let prefix = if dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}{} {} remote, {fetched} downloaded, {deleted} deleted, {failed} failed",
        "✓".green(),
        report.remote_count
    );
}

fn restart_slideshow(home: &Path, config: &Config, dir: &Path) -> Result<()> {
    println!(" ---> Restarting slideshow");
    let mut slideshow = ProcessSlideshow::from_config_at(&config.slideshow, home);
    match slideshow
        .restart(dir)
        .with_context(|| format!("failed to restart '{}'", config.slideshow.program))?
    {
        Launch::Detached { pid } => println!("{} slideshow running (pid {pid})", "✓".green()),
        Launch::Foreground => println!("{} slideshow exited", "✓".green()),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct PhotoStatus {
    name: String,
    bytes: u64,
    modified: Option<String>,
}

#[derive(Debug, Serialize)]
struct FrameStatusJson {
    photoset_id: String,
    photos_dir: String,
    slideshow_pid: Option<u32>,
    slideshow_running: bool,
    photos: Vec<PhotoStatus>,
}

#[derive(Tabled)]
struct PhotoTableRow {
    #[tabled(rename = "photo")]
    name: String,
    #[tabled(rename = "size")]
    size: String,
    #[tabled(rename = "modified")]
    modified: String,
}

impl StatusArgs {
    fn run(self, home: &Path, config: &Config) -> Result<()> {
        let dir = config.frame.photos_dir_at(home);
        let photos = collect_photos(&dir)?;
        let slideshow = ProcessSlideshow::from_config_at(&config.slideshow, home);
        let recorded = slideshow
            .recorded_pid()
            .context("failed to read slideshow pid file")?;
        let running = slideshow
            .running_pid()
            .context("failed to read slideshow pid file")?;

        if self.json {
            let payload = FrameStatusJson {
                photoset_id: config.frame.photoset_id.clone(),
                photos_dir: dir.display().to_string(),
                slideshow_pid: recorded,
                slideshow_running: running.is_some(),
                photos,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        println!(
            "tinker v{} | photoset {} | {} photos in {}",
            env!("CARGO_PKG_VERSION"),
            display_or_unset(&config.frame.photoset_id),
            photos.len(),
            dir.display()
        );
        match (recorded, running) {
            (_, Some(pid)) => println!("slideshow: {} (pid {pid})", "RUNNING".green().bold()),
            (Some(pid), None) => println!(
                "slideshow: {} (stale pid {pid})",
                "STOPPED".yellow().bold()
            ),
            (None, None) => println!("slideshow: {}", "STOPPED".bright_black().bold()),
        }

        if photos.is_empty() {
            println!("No photos mirrored yet. Run `tinker frame sync`.");
            return Ok(());
        }

        let rows: Vec<PhotoTableRow> = photos
            .into_iter()
            .map(|p| PhotoTableRow {
                name: p.name,
                size: format_size(p.bytes),
                modified: p.modified.unwrap_or_else(|| "-".to_string()),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

/// Regular files in `dir`, sorted by name. A missing directory is empty.
fn collect_photos(dir: &Path) -> Result<Vec<PhotoStatus>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mirror = LocalMirror::open(dir)
        .with_context(|| format!("cannot open photo directory {}", dir.display()))?;
    let names = mirror
        .list()
        .with_context(|| format!("failed to list {}", dir.display()))?;

    let mut photos = Vec::with_capacity(names.len());
    for name in names {
        let path = mirror.path_of(&name);
        let meta = fs::metadata(&path).with_context(|| format!("stat {}", path.display()))?;
        let modified = meta.modified().ok().map(|t| {
            DateTime::<Local>::from(t)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        });
        photos.push(PhotoStatus {
            name,
            bytes: meta.len(),
            modified,
        });
    }
    Ok(photos)
}

fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

fn display_or_unset(value: &str) -> &str {
    if value.trim().is_empty() {
        "(unset)"
    } else {
        value
    }
}
