//! Domain types shared by the chat and photo-frame tools.
//!
//! All types are serializable/deserializable via serde; `SizeVariant` is also
//! the value stored under `frame.size` in the YAML config.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Photo frame
// ---------------------------------------------------------------------------

/// Size suffix of a remote photo rendition.
///
/// Chosen by configuration, never derived from content. `Medium640` (`z`) is
/// what the frame has always mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizeVariant {
    /// `m`: 240 px on the longest side.
    Small,
    /// `s`: 75 px square.
    Square,
    /// `t`: 100 px on the longest side.
    Thumbnail,
    /// `z`: 640 px on the longest side.
    #[default]
    Medium640,
    /// `b`: 1024 px on the longest side.
    Large,
}

impl SizeVariant {
    pub fn suffix(self) -> char {
        match self {
            SizeVariant::Small => 'm',
            SizeVariant::Square => 's',
            SizeVariant::Thumbnail => 't',
            SizeVariant::Medium640 => 'z',
            SizeVariant::Large => 'b',
        }
    }
}

impl fmt::Display for SizeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

impl FromStr for SizeVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(SizeVariant::Small),
            "s" => Ok(SizeVariant::Square),
            "t" => Ok(SizeVariant::Thumbnail),
            "z" => Ok(SizeVariant::Medium640),
            "b" => Ok(SizeVariant::Large),
            other => Err(format!(
                "unknown size variant '{other}'; expected one of: m, s, t, z, b"
            )),
        }
    }
}

impl Serialize for SizeVariant {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SizeVariant {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Metadata of one photo in the remote album.
///
/// Identity is the `(id, secret)` pair; `farm` and `server` only locate the
/// file on the static host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: String,
    pub secret: String,
    pub farm: String,
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl RemoteItem {
    pub fn new(
        id: impl Into<String>,
        secret: impl Into<String>,
        farm: impl Into<String>,
        server: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            farm: farm.into(),
            server: server.into(),
            title: None,
        }
    }

    /// Canonical local filename: `{id}_{secret}_{suffix}.jpg`.
    pub fn filename(&self, size: SizeVariant) -> String {
        format!("{}_{}_{}.jpg", self.id, self.secret, size.suffix())
    }

    /// Static download URL for this rendition.
    pub fn download_url(&self, size: SizeVariant) -> String {
        format!(
            "https://farm{}.staticflickr.com/{}/{}",
            self.farm,
            self.server,
            self.filename(size)
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
