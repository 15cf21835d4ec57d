//! Error types for settings loading.

use std::path::PathBuf;

/// Fatal configuration errors.
///
/// There is no safe default for a missing calibration target, so these two
/// conditions abort initialization. The loader returns them as values; the
/// binary decides whether to exit.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Settings file does not exist or cannot be opened for reading
    #[error("cannot open settings file {path}: {source}")]
    Unreadable {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Camera count outside the supported range
    #[error("num_of_cam must be 1 or 2, got {0}")]
    CameraCount(i64),
}

/// Per-field lookup failures from the settings document.
///
/// These are never fatal by themselves: each call site decides whether a
/// missing or mistyped key falls back to a default or propagates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// Key not present in the document
    #[error("settings key `{0}` is missing")]
    Missing(String),

    /// Key present but holds a different value kind
    #[error("settings key `{key}` is not a {expected}")]
    WrongType {
        /// Offending key
        key: String,
        /// Value kind the caller asked for
        expected: &'static str,
    },

    /// Matrix key present but its dimensions do not fit
    #[error("matrix `{key}` has shape {rows}x{cols}, expected {expected}")]
    BadShape {
        /// Offending key
        key: String,
        /// Declared row count
        rows: usize,
        /// Declared column count
        cols: usize,
        /// Shape the caller asked for
        expected: &'static str,
    },
}
