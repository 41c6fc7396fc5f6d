//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use wp_orchestrator_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Remote session could not be established (unreachable host, rejected auth, missing key)
    #[error("Connect error: {host} - {message}")]
    Connect { host: String, message: String },

    /// A remote command exited non-zero or wrote to stderr
    #[error("Command failed on {host}: `{command}`: {detail}")]
    Command {
        host: String,
        command: String,
        detail: String,
    },

    /// A remote command did not finish in time
    #[error("Command timed out on {host} after {secs}s: `{command}`")]
    Timeout {
        host: String,
        command: String,
        secs: u64,
    },

    /// Content generation failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// Expected values could not be parsed from a remote file
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Status update delivery failed
    #[error("Reporting error: {0}")]
    Reporting(String),

    /// Key pair could not be loaded or generated
    #[error("Key material error: {0}")]
    KeyMaterial(String),

    /// Task journal read/write failed
    #[error("Journal error: {0}")]
    Journal(String),

    /// Report mail could not be built or sent
    #[error("Mail error: {0}")]
    Mail(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (bad input, unreachable host, rejected command),
    /// used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Connect { .. }
            | Self::Command { .. }
            | Self::Timeout { .. }
            | Self::Generation(_)
            | Self::Extraction(_)
            | Self::ValidationError(_) => true,
            Self::Provider(e) => e.is_expected(),
            _ => false,
        }
    }

    /// Whether the error means the remote session itself is gone.
    ///
    /// Best-effort steps swallow command failures but must still stop on these.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
