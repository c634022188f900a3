//! One sync pass: list, reconcile, fetch, delete.
//!
//! Fetches run before deletes, so an aborted pass never leaves the frame with
//! fewer photos than it started with.

use tinker_core::{
    config::{FetchErrorPolicy, FrameConfig},
    SizeVariant,
};

use crate::error::MirrorError;
use crate::fetch::Downloader;
use crate::mirror::LocalMirror;
use crate::reconcile::reconcile;
use crate::source::PhotoSource;

/// Inputs of a sync pass that are not collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub collection_id: String,
    pub size: SizeVariant,
    pub on_fetch_error: FetchErrorPolicy,
    pub dry_run: bool,
}

impl SyncOptions {
    pub fn from_config(config: &FrameConfig, dry_run: bool) -> Self {
        Self {
            collection_id: config.photoset_id.clone(),
            size: config.size,
            on_fetch_error: config.on_fetch_error,
            dry_run,
        }
    }
}

/// Outcome for one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Already mirrored; nothing to do.
    Present { name: String },
    /// Downloaded and written.
    Fetched { name: String, url: String },
    /// Removed from the mirror.
    Deleted { name: String },
    /// `--dry-run`: would have been downloaded.
    WouldFetch { name: String, url: String },
    /// `--dry-run`: would have been removed.
    WouldDelete { name: String },
    /// Download failed under the `skip` policy.
    Failed { name: String, reason: String },
}

/// Everything a pass did, in order: present, fetches, deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub remote_count: usize,
    pub actions: Vec<SyncAction>,
}

impl SyncReport {
    /// Whether the local photo set actually changed.
    pub fn changed(&self) -> bool {
        self.actions.iter().any(|a| {
            matches!(
                a,
                SyncAction::Fetched { .. } | SyncAction::Deleted { .. }
            )
        })
    }

    pub fn count(&self, pred: impl Fn(&SyncAction) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(a)).count()
    }
}

/// Run one pass against `source`, writing through `downloader` into `mirror`.
pub fn run(
    source: &dyn PhotoSource,
    downloader: &dyn Downloader,
    mirror: &LocalMirror,
    options: &SyncOptions,
) -> Result<SyncReport, MirrorError> {
    let remote = source.list_items(&options.collection_id)?;
    let listing = mirror.scan()?;
    let local = listing.names;
    let plan = reconcile(&remote, &local, options.size);
    tracing::debug!(
        remote = remote.len(),
        local = local.len(),
        fetch = plan.to_fetch.len(),
        delete = plan.to_delete.len(),
        "reconciled"
    );

    let mut report = SyncReport {
        remote_count: remote.len(),
        actions: Vec::new(),
    };

    for name in &plan.present {
        tracing::debug!("already have: {name}");
        report.actions.push(SyncAction::Present { name: name.clone() });
    }

    for item in &plan.to_fetch {
        let name = item.filename(options.size);
        let url = item.download_url(options.size);

        if options.dry_run {
            tracing::info!("[dry-run] would fetch: {url}");
            report.actions.push(SyncAction::WouldFetch { name, url });
            continue;
        }

        let written = downloader
            .fetch(&url)
            .and_then(|bytes| mirror.write(&name, &bytes));
        match written {
            Ok(_) => report.actions.push(SyncAction::Fetched { name, url }),
            Err(err) => match options.on_fetch_error {
                FetchErrorPolicy::Abort => return Err(err),
                FetchErrorPolicy::Skip => {
                    tracing::warn!("skipping {name}: {err}");
                    report.actions.push(SyncAction::Failed {
                        name,
                        reason: err.to_string(),
                    });
                }
            },
        }
    }

    for name in plan.to_delete {
        if options.dry_run {
            tracing::info!("[dry-run] would delete: {name}");
            report.actions.push(SyncAction::WouldDelete { name });
            continue;
        }
        mirror.remove(&name)?;
        report.actions.push(SyncAction::Deleted { name });
    }

    // No remote item derives a non-UTF-8 name.
    for raw in listing.non_utf8 {
        let name = raw.to_string_lossy().into_owned();
        if options.dry_run {
            tracing::info!("[dry-run] would delete: {name}");
            report.actions.push(SyncAction::WouldDelete { name });
            continue;
        }
        mirror.remove_raw(&raw)?;
        report.actions.push(SyncAction::Deleted { name });
    }

    Ok(report)
}
