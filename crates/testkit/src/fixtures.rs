//! Fixture loading from `crates/testkit/fixtures`.

use profile_store_domain::AssistantConfig;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::{fmt, fs};

/// Errors raised while loading fixtures.
#[derive(Debug)]
pub enum FixtureError {
    /// Fixture file does not exist.
    Missing {
        /// Path that could not be found.
        path: PathBuf,
    },
    /// Fixture file could not be read.
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Fixture file could not be parsed.
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

impl fmt::Display for FixtureError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { path } => write!(formatter, "missing fixture: {}", path.display()),
            Self::Read { path, source } => {
                write!(formatter, "failed to read fixture {}: {source}", path.display())
            },
            Self::Parse { path, source } => {
                write!(formatter, "failed to parse fixture {}: {source}", path.display())
            },
        }
    }
}

impl std::error::Error for FixtureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Missing { .. } => None,
        }
    }
}

/// Absolute path of the fixture directory.
pub fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Read a fixture file as text.
pub fn read_fixture(relative_path: &str) -> Result<String, FixtureError> {
    let path = fixture_root().join(relative_path);
    match fs::read_to_string(&path) {
        Ok(contents) => Ok(contents),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            Err(FixtureError::Missing { path })
        },
        Err(error) => Err(FixtureError::Read {
            path,
            source: error,
        }),
    }
}

/// Read and decode a JSON fixture.
pub fn load_json_fixture<T: DeserializeOwned>(relative_path: &str) -> Result<T, FixtureError> {
    let contents = read_fixture(relative_path)?;
    serde_json::from_str(&contents).map_err(|error| FixtureError::Parse {
        path: fixture_root().join(relative_path),
        source: error,
    })
}

/// Records used to seed stores in integration tests, in unsorted order.
pub fn seed_records() -> Result<Vec<AssistantConfig>, FixtureError> {
    load_json_fixture("records/seed-records.json")
}
