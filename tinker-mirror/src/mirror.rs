//! Local mirror directory.
//!
//! ## `write` — atomic protocol
//!
//! 1. Write bytes to `<name>.tinker.tmp` in the mirror directory.
//! 2. Rename to `<name>` (atomic on POSIX).
//! 3. On rename failure, remove the `.tmp` and surface the error.
//!
//! A crash between 1 and 2 leaves a `.tmp` file behind; the next pass sees a
//! filename no remote item derives and deletes it.
//!
//! Files whose names are not valid UTF-8 can never match a remote item. They
//! are listed separately in [`Listing::non_utf8`] and removed by their raw
//! name, so they are never confused with a lossily converted lookalike.

use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, MirrorError};

/// Suffix of in-flight downloads.
pub const TMP_SUFFIX: &str = ".tinker.tmp";

/// Regular files found in the mirror directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub names: BTreeSet<String>,
    pub non_utf8: Vec<OsString>,
}

/// A directory of mirrored photos, addressed by bare filename.
#[derive(Debug, Clone)]
pub struct LocalMirror {
    dir: PathBuf,
}

impl LocalMirror {
    /// Open `dir`, creating it if missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, MirrorError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Whether `name` exists in the mirror.
    pub fn contains(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    /// Regular files in the mirror. Subdirectories are ignored.
    pub fn scan(&self) -> Result<Listing, MirrorError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        let mut listing = Listing::default();
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&self.dir, e))?;
            let file_type = entry.file_type().map_err(|e| io_err(entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => {
                    listing.names.insert(name);
                }
                Err(raw) => listing.non_utf8.push(raw),
            }
        }
        listing.non_utf8.sort();
        Ok(listing)
    }

    /// UTF-8 names of the regular files in the mirror.
    pub fn list(&self) -> Result<BTreeSet<String>, MirrorError> {
        Ok(self.scan()?.names)
    }

    /// Atomically write `bytes` as `name`.
    pub fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, MirrorError> {
        let path = self.path_of(name);
        let tmp = self.path_of(&format!("{name}{TMP_SUFFIX}"));
        write_with_tmp(&path, bytes, &tmp)?;
        tracing::info!("wrote: {}", path.display());
        Ok(path)
    }

    /// Delete `name`. A file that is already gone counts as deleted.
    pub fn remove(&self, name: &str) -> Result<(), MirrorError> {
        self.remove_raw(OsStr::new(name))
    }

    /// Delete a file by its raw on-disk name.
    pub fn remove_raw(&self, name: &OsStr) -> Result<(), MirrorError> {
        let path = self.dir.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!("deleted: {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("already gone: {}", path.display());
                Ok(())
            }
            Err(e) => Err(io_err(&path, e)),
        }
    }
}

fn write_with_tmp(path: &Path, bytes: &[u8], tmp: &Path) -> Result<(), MirrorError> {
    std::fs::write(tmp, bytes).map_err(|e| io_err(tmp, e))?;
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}
