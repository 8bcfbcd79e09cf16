//! Error types for strict tag configuration parsing.
//!
//! The default (lenient) load path never returns these; it logs and falls
//! back to defaults. They surface from [`ParseMode::Strict`] loads and from
//! `validate`.
//!
//! [`ParseMode::Strict`]: crate::tags::ParseMode::Strict

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Kind of value a cell was expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Number,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Bool => write!(f, "boolean"),
            ValueKind::Number => write!(f, "numeric"),
        }
    }
}

/// Failure while reading or validating a tag settings table.
#[derive(Debug, Error)]
pub enum TagConfigError {
    #[error("failed to read tag settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tag settings table: {0}")]
    Csv(#[from] csv::Error),

    #[error("tag settings table is missing a header row")]
    MissingHeader,

    #[error("row {row}: invalid {kind} value '{value}' in column '{column}'")]
    InvalidValue {
        row: usize,
        column: String,
        kind: ValueKind,
        value: String,
    },

    #[error("unrecognized column '{0}'")]
    UnknownColumn(String),
}

impl TagConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Data row number (1 is the header) the error points at, if any.
    pub fn row(&self) -> Option<usize> {
        match self {
            TagConfigError::InvalidValue { row, .. } => Some(*row),
            _ => None,
        }
    }
}

/// Result type for tag configuration operations.
pub type Result<T> = std::result::Result<T, TagConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_message() {
        let err = TagConfigError::InvalidValue {
            row: 4,
            column: "MaxGap".to_string(),
            kind: ValueKind::Number,
            value: "soon".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "row 4: invalid numeric value 'soon' in column 'MaxGap'"
        );
        assert_eq!(err.row(), Some(4));
    }

    #[test]
    fn test_io_message_includes_path() {
        let err = TagConfigError::io(
            "/tmp/tag_settings.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/tag_settings.csv"));
        assert_eq!(err.row(), None);
    }
}
