//! Architectural element kinds.
//!
//! The C4 model distinguishes a small, closed set of element kinds. The
//! external parser delivers kinds as free-form strings (including synonyms
//! such as `database` or `actor`); [`ElementKind::normalize`] folds them into
//! [`ElementKind`] once, at extraction time.
//!
//! Each kind also carries the node size bounds used both when sizing an
//! element from its text and when deriving size constraints.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Size;

/// Upper bound on any node size, in pixels.
pub const MAX_NODE_SIZE: Size = Size::new(500.0, 300.0);

/// Error returned when a kind string names no known element kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown element kind `{0}`")]
pub struct UnknownKind(pub String);

/// The kind of an architectural element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Person,
    System,
    Container,
    Component,
    Datastore,
    Queue,
}

impl ElementKind {
    /// Normalize a raw kind string, folding synonyms.
    ///
    /// Matching is case-insensitive. `database`, `db` and `storage` map to
    /// [`ElementKind::Datastore`], `mq` to [`ElementKind::Queue`] and `actor`
    /// to [`ElementKind::Person`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use astrolabe_core::kind::ElementKind;
    /// assert_eq!(ElementKind::normalize("DB"), Ok(ElementKind::Datastore));
    /// assert_eq!(ElementKind::normalize("actor"), Ok(ElementKind::Person));
    /// assert!(ElementKind::normalize("spaceship").is_err());
    /// ```
    pub fn normalize(raw: &str) -> Result<Self, UnknownKind> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "person" | "actor" => Ok(Self::Person),
            "system" => Ok(Self::System),
            "container" => Ok(Self::Container),
            "component" => Ok(Self::Component),
            "datastore" | "database" | "db" | "storage" => Ok(Self::Datastore),
            "queue" | "mq" => Ok(Self::Queue),
            _ => Err(UnknownKind(raw.to_string())),
        }
    }

    /// Returns `true` for the kinds that anchor a context view.
    pub fn is_root_kind(self) -> bool {
        matches!(self, Self::Person | Self::System)
    }

    /// Returns `true` for storage-like kinds (datastores and queues).
    pub fn is_storage(self) -> bool {
        matches!(self, Self::Datastore | Self::Queue)
    }

    /// Minimum node size for this kind, in pixels.
    pub fn min_size(self) -> Size {
        match self {
            Self::Person => Size::new(200.0, 180.0),
            Self::System => Size::new(220.0, 140.0),
            Self::Container => Size::new(200.0, 120.0),
            Self::Component => Size::new(180.0, 100.0),
            Self::Datastore | Self::Queue => Size::new(200.0, 100.0),
        }
    }

    /// Maximum node size for this kind, in pixels.
    pub fn max_size(self) -> Size {
        MAX_NODE_SIZE
    }

    /// Lowercase name as written in the DSL.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::System => "system",
            Self::Container => "container",
            Self::Component => "component",
            Self::Datastore => "datastore",
            Self::Queue => "queue",
        }
    }
}

impl FromStr for ElementKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
