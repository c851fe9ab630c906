//! Local key-value provider selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Storage engine behind the local backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocalProvider {
    /// Process memory only; nothing survives exit.
    Memory,
    /// One file per key under a directory.
    #[default]
    File,
    /// Single SQLite database file.
    Sqlite,
}

impl LocalProvider {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Sqlite => "sqlite",
        }
    }

    /// Resolve the on-disk location for this provider.
    ///
    /// Relative paths are resolved against `base`. SQLite stores its database
    /// as `store.sqlite3` inside the configured directory.
    #[must_use]
    pub fn resolve_location(self, configured: &Path, base: &Path) -> Option<PathBuf> {
        let root = if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            base.join(configured)
        };
        match self {
            Self::Memory => None,
            Self::File => Some(root),
            Self::Sqlite => Some(root.join("store.sqlite3")),
        }
    }
}

impl fmt::Display for LocalProvider {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for LocalProvider {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(()),
        }
    }
}
