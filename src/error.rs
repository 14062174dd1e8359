//! Error type shared by every port and storage/serialization collaborator.
//!
//! Port operations return [`PortResult<T>`]. The orchestrator and the CLI work in
//! `anyhow::Result` and carry a [`PortError`] through unchanged, so callers can
//! still tell programmer misuse ([`ErrorKind::NotInitialized`]) apart from a
//! transport failure with `err.downcast_ref::<PortError>()`.

use std::error::Error;
use std::fmt;

/// Error raised by a port or one of its collaborators.
#[derive(Debug, Clone)]
pub struct PortError {
    pub message: String,
    pub kind: ErrorKind,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or incomplete endpoint parameters, raised before any network call.
    Configuration,
    /// Read or write attempted on a port whose client handle is absent.
    NotInitialized,
    NotFound,
    AlreadyExists,
    Authentication,
    Network,
    /// CSV decoding or Parquet encoding/decoding failed.
    Serialization,
    InvalidInput,
    InternalError,
    Other,
}

impl fmt::Display for PortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)?;
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl Error for PortError {}

impl PortError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The error every port raises when asked to read or write after `close()`.
    pub fn not_initialized(port: &str) -> Self {
        Self::new(
            ErrorKind::NotInitialized,
            format!("{port}: client not initialized"),
        )
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    #[must_use]
    pub fn is_not_initialized(&self) -> bool {
        self.kind == ErrorKind::NotInitialized
    }

    #[must_use]
    pub fn is_configuration(&self) -> bool {
        self.kind == ErrorKind::Configuration
    }
}

pub type PortResult<T> = Result<T, PortError>;

impl From<std::io::Error> for PortError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            std::io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists,
            std::io::ErrorKind::PermissionDenied => ErrorKind::Authentication,
            std::io::ErrorKind::InvalidInput => ErrorKind::InvalidInput,
            _ => ErrorKind::Network,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<arrow::error::ArrowError> for PortError {
    fn from(err: arrow::error::ArrowError) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(feature = "io-parquet")]
impl From<parquet::errors::ParquetError> for PortError {
    fn from(err: parquet::errors::ParquetError) -> Self {
        Self::serialization(err.to_string())
    }
}
