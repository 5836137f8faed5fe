//! Error handling for Strata
//!
//! Every user-facing failure carries a code and a friendly message so the
//! session can turn it into a notification instead of a fault.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Strata operations
pub type Result<T> = std::result::Result<T, StrataError>;

/// Main error type for Strata operations
#[derive(Error, Debug)]
pub enum StrataError {
    // Import Errors
    #[error("Failed to parse snapshot: {reason}")]
    Parse {
        reason: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Scene Builder Errors
    #[error("Layer config is missing required field `{field}`")]
    MissingField { field: String },

    #[error("Layer config field `{field}` is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Scene fuzz has {actual} vertices, mesh needs {expected}")]
    FuzzMismatch { expected: usize, actual: usize },

    // Archive Errors
    #[error("Failed to fetch asset {asset}: {reason}")]
    AssetFetch { asset: String, reason: String },

    #[error("Failed to assemble archive: {reason}")]
    Packaging { reason: String },

    #[error("An archive export is already in progress")]
    ExportInProgress,

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StrataError {
    /// Wrap a JSON error raised while reading user-supplied text.
    pub fn parse(source: serde_json::Error) -> Self {
        StrataError::Parse {
            reason: source.to_string(),
            source: Some(source),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        StrataError::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        StrataError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            StrataError::Parse { .. } => "PARSE_ERROR",
            StrataError::MissingField { .. } => "MISSING_FIELD",
            StrataError::InvalidField { .. } => "INVALID_FIELD",
            StrataError::FuzzMismatch { .. } => "FUZZ_MISMATCH",
            StrataError::AssetFetch { .. } => "ASSET_FETCH_ERROR",
            StrataError::Packaging { .. } => "PACKAGING_ERROR",
            StrataError::ExportInProgress => "EXPORT_IN_PROGRESS",
            StrataError::FileNotFound { .. } => "FILE_NOT_FOUND",
            StrataError::Io(_) => "IO_ERROR",
            StrataError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the user can simply retry or fix their input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StrataError::Parse { .. }
                | StrataError::AssetFetch { .. }
                | StrataError::ExportInProgress
                | StrataError::FuzzMismatch { .. }
        )
    }

    /// Get a user-friendly message for this error
    pub fn friendly_message(&self) -> String {
        match self {
            StrataError::Parse { .. }
            | StrataError::MissingField { .. }
            | StrataError::InvalidField { .. }
            | StrataError::FuzzMismatch { .. } => {
                "Failed to parse or send, incorrect format?".to_string()
            }
            StrataError::AssetFetch { .. } | StrataError::Packaging { .. } => {
                "Failed to create .zip".to_string()
            }
            StrataError::ExportInProgress => {
                "An export is already running, please wait for it to finish".to_string()
            }
            _ => self.to_string(),
        }
    }
}
