//! Process exit codes and CLI-local failures.
//!
//! Store and config failures are rendered as `status: error` output by the
//! commands themselves; `CliError` covers what happens around them (reading
//! the draft, writing stdout, encoding the response).

/// Exit status of one `pstore` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    /// Invariant or unexpected failure.
    Internal = 1,
    /// Expected failure: bad input, not found, size limit.
    InvalidInput = 2,
    /// Reading the draft or writing output failed.
    Io = 3,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput(_) => ExitCode::InvalidInput,
            Self::Io(_) => ExitCode::Io,
            Self::Serialization(_) => ExitCode::Internal,
        }
    }
}
