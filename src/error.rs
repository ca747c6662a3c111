//! Error types for fieldstream

use std::io;
use thiserror::Error;

/// Errors produced while configuring or driving a tokenizer
#[derive(Error, Debug)]
pub enum CsvError {
    /// The configuration cannot be used (e.g. a reserved separator)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `next_field` was called after the last field was delivered
    #[error("No more fields available")]
    NoMoreFields,

    /// The underlying character source failed while reading or closing
    #[error("Failed to read from character source: {0}")]
    SourceRead(#[source] io::Error),

    /// A previous source failure left the tokenizer unusable
    #[error("Tokenizer is unusable after a source failure")]
    Poisoned,

    /// Failure outside the tokenizer, such as opening a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for fieldstream operations
pub type Result<T> = std::result::Result<T, CsvError>;
