//! Error types for the OE2010 conversion pipeline.
//!
//! This module defines a hierarchy of error types, one per stage:
//!
//! - [`LoadError`] - Reading the input table (locked file, malformed text, corrupt sheet)
//! - [`RulesError`] - Loading a custom classifier rule table
//! - [`GenderError`] - Initializing the name dictionary behind the gender estimator
//! - [`WriteError`] - Emitting the OE2010 CSV
//! - [`ConvertError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while reading the input table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file is held open by another program (typically a spreadsheet editor).
    #[error("File is open in another program: {}", path.display())]
    Locked { path: PathBuf },

    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid delimited text.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet could not be opened or read.
    #[error("Invalid spreadsheet: {0}")]
    Spreadsheet(String),

    /// Empty file.
    #[error("Input file is empty")]
    EmptyFile,

    /// No header row.
    #[error("No headers found in input")]
    NoHeaders,
}

impl LoadError {
    /// Whether this is the user-correctable "close the file and retry" case.
    pub fn is_locked(&self) -> bool {
        matches!(self, LoadError::Locked { .. })
    }
}

// =============================================================================
// Rule Table Errors
// =============================================================================

/// Errors while loading a classifier rule table.
#[derive(Debug, Error)]
pub enum RulesError {
    /// Rule file could not be read.
    #[error("Cannot read rule table: {0}")]
    Io(#[from] std::io::Error),

    /// Rule file is not a valid rule table.
    #[error("Invalid rule table JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A pattern rule does not compile.
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

// =============================================================================
// Gender Lookup Errors
// =============================================================================

/// Errors while initializing the name dictionary.
///
/// Cloneable because the initialization result is cached and handed to
/// every caller that waits on it.
#[derive(Debug, Clone, Error)]
pub enum GenderError {
    /// Dictionary file could not be read.
    #[error("Cannot read name dictionary '{path}': {message}")]
    Unreadable { path: String, message: String },

    /// A dictionary line is not `Name<TAB>category`.
    #[error("Malformed name dictionary line {line}: '{content}'")]
    MalformedLine { line: usize, content: String },

    /// A dictionary line names an unknown category.
    #[error("Unknown gender category '{category}' on line {line}")]
    UnknownCategory { line: usize, category: String },
}

// =============================================================================
// Write Errors
// =============================================================================

/// Errors while emitting the OE2010 file.
#[derive(Debug, Error)]
pub enum WriteError {
    /// IO failure.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failure.
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Conversion Errors (top-level)
// =============================================================================

/// Top-level conversion errors.
///
/// This is the error type returned by [`crate::transform::pipeline::Converter::run`].
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input could not be loaded.
    #[error("{0}")]
    Load(#[from] LoadError),

    /// Custom rule table could not be loaded.
    #[error("{0}")]
    Rules(#[from] RulesError),

    /// Gender lookup unavailable. Fatal for any path that needs it.
    #[error("Gender lookup unavailable: {0}")]
    Gender(#[from] GenderError),

    /// Output could not be written.
    #[error("{0}")]
    Write(#[from] WriteError),
}

impl ConvertError {
    /// Whether the process must stop rather than let the user retry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConvertError::Gender(_))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for rule table operations.
pub type RulesResult<T> = Result<T, RulesError>;

/// Result type for gender lookup operations.
pub type GenderResult<T> = Result<T, GenderError>;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let load_err = LoadError::EmptyFile;
        let convert_err: ConvertError = load_err.into();
        assert!(convert_err.to_string().contains("empty"));
        assert!(!convert_err.is_fatal());

        let gender_err = GenderError::MalformedLine { line: 3, content: "Ayşe".into() };
        let convert_err: ConvertError = gender_err.into();
        assert!(convert_err.to_string().contains("line 3"));
        assert!(convert_err.is_fatal());
    }

    #[test]
    fn test_locked_is_distinct() {
        let err = LoadError::Locked { path: PathBuf::from("kayit.xlsx") };
        assert!(err.is_locked());
        assert!(err.to_string().contains("kayit.xlsx"));
        assert!(!LoadError::NoHeaders.is_locked());
    }
}
