use thiserror::Error;

/// Core error types for hms-lsp.
///
/// Covers URI normalization and the external analyzer call. Everything else in
/// the server degrades to empty results instead of failing.
///
/// # Examples
///
/// ```
/// use hms_core::error::{HmsError, Result};
///
/// fn require_file_scheme(scheme: &str) -> Result<()> {
///     if scheme != "file" {
///         return Err(HmsError::UnsupportedScheme(scheme.into()));
///     }
///     Ok(())
/// }
///
/// assert!(require_file_scheme("https").is_err());
/// ```
#[derive(Error, Debug)]
pub enum HmsError {
    #[error("invalid URI: {0}")]
    InvalidUri(String),

    #[error("unsupported URI scheme: {0} (only file:// URIs are supported)")]
    UnsupportedScheme(String),

    #[error("unsupported platform: file paths must be POSIX-style absolute paths")]
    UnsupportedPlatform,

    #[error("failed to spawn analyzer {command}: {source}")]
    AnalyzerSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("analyzer {command} exited with {status}: {stderr}")]
    AnalyzerFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("malformed analyzer output: {0}")]
    AnalyzerOutput(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HmsError {
    /// Returns true for the errors that reject a document URI.
    pub fn is_invalid_uri(&self) -> bool {
        matches!(
            self,
            Self::InvalidUri(_) | Self::UnsupportedScheme(_) | Self::UnsupportedPlatform
        )
    }
}

/// Convenience type alias for `Result<T, HmsError>`.
pub type Result<T> = std::result::Result<T, HmsError>;
