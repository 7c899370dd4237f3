// Load-time errors
// Filtering and aggregation are total, so these are the only failures the engine reports.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    /// The source could not be opened or read
    #[error("Source unavailable: {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more required columns are absent from the header row
    #[error("Schema error: missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A row could not be converted into a record
    #[error("Parse error on line {line}, field {field} = {value:?}: {reason}")]
    Parse {
        line: u64,
        field: String,
        value: String,
        reason: String,
    },
}

impl LoadError {
    pub fn parse(line: u64, field: &str, value: &str, reason: impl Into<String>) -> Self {
        LoadError::Parse {
            line,
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Short kind name, useful for display layers
    pub fn kind(&self) -> &str {
        match self {
            LoadError::SourceUnavailable { .. } => "SourceUnavailable",
            LoadError::Schema { .. } => "SchemaError",
            LoadError::Parse { .. } => "ParseError",
        }
    }
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
