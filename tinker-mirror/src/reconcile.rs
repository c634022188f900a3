//! Remote-vs-local reconciliation.
//!
//! Pure: no I/O, no clock. Identity on both sides is the derived filename,
//! so content and timestamps never enter the decision.

use std::collections::BTreeSet;

use tinker_core::{RemoteItem, SizeVariant};

/// Actions that bring a local mirror in line with the remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    /// Remote items whose filename is absent locally, in remote order,
    /// one per filename.
    pub to_fetch: Vec<RemoteItem>,
    /// Local filenames the remote collection cannot reproduce.
    pub to_delete: BTreeSet<String>,
    /// Filenames present on both sides.
    pub present: BTreeSet<String>,
}

impl Reconciliation {
    pub fn changed(&self) -> bool {
        !self.to_fetch.is_empty() || !self.to_delete.is_empty()
    }
}

/// Compute fetch and delete sets for `remote` against `local`.
pub fn reconcile(
    remote: &[RemoteItem],
    local: &BTreeSet<String>,
    size: SizeVariant,
) -> Reconciliation {
    let mut remote_names = BTreeSet::new();
    let mut to_fetch = Vec::new();
    let mut present = BTreeSet::new();

    for item in remote {
        let name = item.filename(size);
        if !remote_names.insert(name.clone()) {
            continue;
        }
        if local.contains(&name) {
            present.insert(name);
        } else {
            to_fetch.push(item.clone());
        }
    }

    let to_delete = local.difference(&remote_names).cloned().collect();

    Reconciliation {
        to_fetch,
        to_delete,
        present,
    }
}
