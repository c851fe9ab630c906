//! Domain primitives with validated constructors.

use profile_store_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `ConfigId` is empty after trimming.
    EmptyConfigId {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `ConfigName` is empty after trimming.
    EmptyConfigName {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `Identity` is empty after trimming.
    EmptyIdentity {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyConfigId { .. } => ErrorCode::new("domain", "invalid_config_id"),
            Self::EmptyConfigName { .. } => ErrorCode::new("domain", "invalid_config_name"),
            Self::EmptyIdentity { .. } => ErrorCode::new("domain", "invalid_identity"),
        }
    }

    const fn input_length(&self) -> usize {
        match self {
            Self::EmptyConfigId { input_length }
            | Self::EmptyConfigName { input_length }
            | Self::EmptyIdentity { input_length } => *input_length,
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyConfigId { .. } => formatter.write_str("config id must be non-empty"),
            Self::EmptyConfigName { .. } => formatter.write_str("config name must be non-empty"),
            Self::EmptyIdentity { .. } => formatter.write_str("identity must be non-empty"),
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        Self::expected(error.error_code(), error.to_string())
            .with_metadata("input_length", error.input_length().to_string())
    }
}

fn trimmed_non_empty(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Opaque identifier of a configuration record, stable for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigId(Box<str>);

impl ConfigId {
    /// Parse a `ConfigId` from user input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::EmptyConfigId {
                input_length: raw.len(),
            });
        };

        Ok(Self(trimmed.into()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ConfigId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ConfigId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Display name of a configuration. Always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigName(Box<str>);

impl ConfigName {
    /// Parse a `ConfigName`, trimming surrounding whitespace.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::EmptyConfigName {
                input_length: raw.len(),
            });
        };

        Ok(Self(trimmed.into()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ConfigName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ConfigName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Authenticated account identity presented by the session oracle.
///
/// Its presence selects the remote backend; absence selects the local one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Box<str>);

impl Identity {
    /// Parse an `Identity` from an external session value.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::EmptyIdentity {
                input_length: raw.len(),
            });
        };

        Ok(Self(trimmed.into()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_name_is_trimmed() -> Result<(), PrimitiveError> {
        let name = ConfigName::parse("  Helper ")?;
        assert_eq!(name.as_str(), "Helper");
        Ok(())
    }

    #[test]
    fn blank_values_are_rejected_with_input_length() {
        assert_eq!(
            ConfigName::parse(" \t"),
            Err(PrimitiveError::EmptyConfigName { input_length: 2 })
        );
        assert_eq!(
            ConfigId::parse(""),
            Err(PrimitiveError::EmptyConfigId { input_length: 0 })
        );
        assert_eq!(
            Identity::parse("   "),
            Err(PrimitiveError::EmptyIdentity { input_length: 3 })
        );
    }

    #[test]
    fn primitive_errors_map_into_envelopes() {
        let envelope: ErrorEnvelope = PrimitiveError::EmptyConfigName { input_length: 1 }.into();
        assert_eq!(envelope.code.to_string(), "domain:invalid_config_name");
        assert_eq!(
            envelope.metadata.get("input_length").map(String::as_str),
            Some("1")
        );
    }
}
