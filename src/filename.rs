//! Output file names built from record values.

use crate::error::PipelineError;
use formfill_types::{ColumnName, TabularRecord};

pub const DEFAULT_EXTENSION: &str = "pdf";

/// Builds a file name from an ordered selection of columns.
///
/// Missing values are skipped. Path separators become `-` and spaces become
/// `_`, so the result is always a bare file name. Two records with the same
/// selected values get the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameComposer {
    columns: Vec<ColumnName>,
    extension: String,
}

impl FilenameComposer {
    pub fn new(columns: Vec<ColumnName>) -> Result<Self, PipelineError> {
        if columns.is_empty() {
            return Err(PipelineError::NoColumnsSelected);
        }
        Ok(Self { columns, extension: DEFAULT_EXTENSION.to_string() })
    }

    /// Replaces the extension, given with or without its leading dot.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    /// Returns `None` when every selected column is missing from `record`.
    pub fn compose(&self, record: &TabularRecord) -> Option<String> {
        let parts: Vec<String> = self
            .columns
            .iter()
            .filter_map(|column| record.get(column.as_str()))
            .filter_map(|value| value.as_text())
            .map(|text| sanitize(&text))
            .collect();
        if parts.is_empty() {
            return None;
        }
        Some(format!("{}.{}", parts.join("-"), self.extension))
    }
}

/// Replaces path separators with `-` and spaces with `_`.
pub fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            '/' | '\\' => '-',
            ' ' => '_',
            other => other,
        })
        .collect()
}

/// Parses a 1-based column selection such as `"2, 1"` against `columns`.
///
/// Numbers outside the range are logged and ignored. A selection that leaves
/// no column is `NoColumnsSelected`; anything that is not a number is an
/// `InvalidColumnSelection`, which the caller may ask for again.
pub fn parse_column_selection(
    input: &str,
    columns: &[ColumnName],
) -> Result<Vec<ColumnName>, PipelineError> {
    let mut selected = Vec::new();
    for token in input.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
        let number: usize = token.parse().map_err(|_| PipelineError::InvalidColumnSelection {
            input: input.to_string(),
            reason: format!("'{token}' is not a column number"),
        })?;
        match number.checked_sub(1).and_then(|i| columns.get(i)) {
            Some(column) => selected.push(column.clone()),
            None => log::warn!("Column number {} is out of range (1-{}), skipping", number, columns.len()),
        }
    }
    if selected.is_empty() {
        return Err(PipelineError::NoColumnsSelected);
    }
    Ok(selected)
}
