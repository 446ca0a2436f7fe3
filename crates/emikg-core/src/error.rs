use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column {column:?} in {}", file.display())]
    MissingColumn { file: PathBuf, column: String },

    #[error("Row count mismatch in {}: expected {expected}, found {actual}", file.display())]
    RowCountMismatch {
        file: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid IRI: {0}")]
    Iri(#[from] oxrdf::IriParseError),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
