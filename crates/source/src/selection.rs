use crate::error::SourceError;
use formfill_types::{DataSet, TypesError};

/// Which rows of a source take part in the merge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowSelection {
    #[default]
    All,
    /// Explicit zero-based indices, in the order given. Duplicates are kept.
    Indices(Vec<usize>),
}

impl RowSelection {
    /// Parses user input: empty or `all` selects every row, otherwise a list
    /// of indices separated by commas and/or whitespace.
    pub fn parse(input: &str) -> Result<Self, SourceError> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(RowSelection::All);
        }
        let indices = trimmed
            .replace(',', " ")
            .split_whitespace()
            .map(|token| {
                token.parse::<usize>().map_err(|_| SourceError::InvalidRowSelection {
                    input: input.to_string(),
                    reason: format!("'{token}' is not a row index"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RowSelection::Indices(indices))
    }

    /// Applies the selection to a data set, failing on indices past its end.
    pub fn apply(&self, data: &DataSet) -> Result<DataSet, SourceError> {
        match self {
            RowSelection::All => Ok(data.clone()),
            RowSelection::Indices(indices) => data.select_rows(indices).map_err(|e| match e {
                TypesError::RowOutOfRange { index, len } => SourceError::InvalidRowSelection {
                    input: format_indices(indices),
                    reason: format!("row {index} does not exist (source has {len} rows)"),
                },
                other => SourceError::InvalidRowSelection {
                    input: format_indices(indices),
                    reason: other.to_string(),
                },
            }),
        }
    }
}

fn format_indices(indices: &[usize]) -> String {
    indices.iter().map(usize::to_string).collect::<Vec<_>>().join(",")
}
