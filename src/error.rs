//! Error types for shared-table-names

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a model file or writing its resolution.
///
/// Name resolution itself never fails; these cover the surrounding file handling.
#[derive(Error, Debug)]
pub enum NamingError {
    #[error("Failed to read model file: {path}")]
    ModelReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model file: {path}")]
    ModelParseError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Invalid model file format: {message}")]
    InvalidModelFormat { message: String },

    #[error("Unknown record type '{name}' referenced from {referenced_from}")]
    UnknownRecordType {
        name: String,
        referenced_from: String,
    },

    #[error("Maximum identifier length must be at least 1, got {length}")]
    InvalidIdentifierLength { length: usize },

    #[error("Failed to write resolved model to {path}")]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
