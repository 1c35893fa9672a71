// src/error.rs
//! The error taxonomy of the fill pipeline.

use crate::rename::RenameState;
use formfill_acroform::AcroFormError;
use formfill_source::SourceError;
use std::path::PathBuf;
use thiserror::Error;

/// A comprehensive error type for the form-filling pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Template '{path}' could not be read: {source}")]
    TemplateUnreadable {
        path: PathBuf,
        #[source]
        source: AcroFormError,
    },

    #[error("Merging the data sources produced no records")]
    EmptyMergeResult,

    #[error("Invalid row selection for '{source_name}': {input}: {reason}")]
    InvalidRowSelection {
        source_name: String,
        input: String,
        reason: String,
    },

    #[error("Invalid column selection '{input}': {reason}")]
    InvalidColumnSelection { input: String, reason: String },

    #[error("No columns were selected for file naming")]
    NoColumnsSelected,

    #[error("Unknown column '{0}' selected for file naming")]
    UnknownColumn(String),

    #[error("Column '{0}' has already been assigned to a group")]
    ColumnAlreadyUsed(String),

    #[error("Record {index} has no value in any file-naming column")]
    EmptyFilename { index: usize },

    #[error("Failed to write record {index} to '{path}': {source}")]
    WriteFailure {
        index: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    SaveFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output directory '{path}' is not usable: {source}")]
    OutputDirUnusable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Job file '{path}' could not be read: {source}")]
    JobFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Job file '{path}' is invalid: {source}")]
    JobFileInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("The field mapping must be finalized before it is applied")]
    MappingNotFinalized,

    #[error("Command '{command}' is not allowed while {state}")]
    InvalidRenameCommand { state: RenameState, command: String },

    #[error("Field index {index} is out of range for a catalog of {len} fields")]
    InvalidFieldIndex { index: usize, len: usize },

    #[error("Invalid field name '{0}'")]
    InvalidFieldName(String),

    #[error("Unknown field '{0}' in rename mapping")]
    UnknownField(String),

    #[error("Input was aborted")]
    Aborted,

    #[error("Form error: {0}")]
    AcroForm(#[from] AcroFormError),

    #[error("Data source error: {0}")]
    Source(#[from] SourceError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// True for errors that are resolved by asking the user again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidRowSelection { .. } | PipelineError::InvalidColumnSelection { .. }
        )
    }

    /// Attaches the source name to a row-selection failure from the source crate.
    pub fn from_selection(source_name: &str, error: SourceError) -> Self {
        match error {
            SourceError::InvalidRowSelection { input, reason } => PipelineError::InvalidRowSelection {
                source_name: source_name.to_string(),
                input,
                reason,
            },
            other => PipelineError::Source(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_selection_errors_are_recoverable() {
        let rows = PipelineError::InvalidRowSelection {
            source_name: "a.csv".into(),
            input: "x".into(),
            reason: "bad".into(),
        };
        assert!(rows.is_recoverable());
        assert!(!PipelineError::EmptyMergeResult.is_recoverable());
        assert!(!PipelineError::NoColumnsSelected.is_recoverable());
        assert!(!PipelineError::MappingNotFinalized.is_recoverable());
    }

    #[test]
    fn test_from_selection_keeps_context() {
        let err = PipelineError::from_selection(
            "people.csv",
            SourceError::InvalidRowSelection { input: "9".into(), reason: "row 9 does not exist".into() },
        );
        let message = err.to_string();
        assert!(message.contains("people.csv"));
        assert!(message.contains("row 9"));
    }
}
