use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("CSV error in '{source_name}': {error}")]
    Csv {
        source_name: String,
        #[source]
        error: csv::Error,
    },

    #[error("Could not open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid row selection '{input}': {reason}")]
    InvalidRowSelection { input: String, reason: String },
}
