//! # tinker-mirror
//!
//! Keeps a local photo directory identical to a remote album.
//!
//! [`reconcile`] decides what to fetch and delete; [`pipeline::run`] lists the
//! album through a [`PhotoSource`], downloads through a [`Downloader`] and
//! applies the result to a [`LocalMirror`].

pub mod error;
pub mod fetch;
pub mod mirror;
pub mod pipeline;
pub mod reconcile;
pub mod source;

pub use error::MirrorError;
pub use fetch::{Downloader, HttpDownloader};
pub use mirror::{Listing, LocalMirror};
pub use pipeline::{SyncAction, SyncOptions, SyncReport};
pub use reconcile::{reconcile, Reconciliation};
pub use source::{FlickrSource, PhotoSource};
