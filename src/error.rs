//! Error types for flowquery.

use thiserror::Error;

/// Main error type for flowquery operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error reading or decoding an input file
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Error parsing a filter or selection expression
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// I/O error while writing output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to loading flow files.
#[derive(Error, Debug)]
pub enum InputError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// File exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File content is not a valid flow document
    #[error("Malformed JSON in {path}: {source}")]
    MalformedJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors related to filter and selection expressions.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    /// Clause contains none of the comparison operators
    #[error("no comparison operator (=, >, <) in clause '{clause}'")]
    MissingOperator { clause: String },

    /// Clause has an operator but nothing to its left
    #[error("missing field name in clause '{clause}'")]
    EmptyField { clause: String },

    /// Empty clause between '|' or '&' separators
    #[error("empty clause in filter expression")]
    EmptyClause,

    /// Field path with an empty segment or more than two segments
    #[error("unsupported field path '{path}' (expected name or name.name)")]
    UnsupportedPath { path: String },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
