//! Splits one CSV data set into several, grouping its columns.
//!
//! A combined export often needs to be fed back as separate sources so that
//! the cross-product merge can recombine them. Each column goes to at most one
//! group.

use crate::error::PipelineError;
use crate::filename::sanitize;
use crate::render::write_atomically;
use formfill_types::{ColumnName, DataSet};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub struct ColumnSplitter {
    data: DataSet,
    used: HashSet<ColumnName>,
}

impl ColumnSplitter {
    pub fn new(data: DataSet) -> Self {
        Self { data, used: HashSet::new() }
    }

    /// Columns not yet assigned to a group, in their original order.
    pub fn remaining(&self) -> Vec<ColumnName> {
        self.data
            .columns()
            .iter()
            .filter(|c| !self.used.contains(*c))
            .cloned()
            .collect()
    }

    pub fn is_done(&self) -> bool {
        self.remaining().is_empty()
    }

    /// Claims `columns` for one group and returns its data.
    pub fn take_group(&mut self, columns: &[ColumnName]) -> Result<DataSet, PipelineError> {
        if columns.is_empty() {
            return Err(PipelineError::NoColumnsSelected);
        }
        let mut seen = HashSet::new();
        for column in columns {
            if !self.data.columns().contains(column) {
                return Err(PipelineError::UnknownColumn(column.to_string()));
            }
            if self.used.contains(column) || !seen.insert(column) {
                return Err(PipelineError::ColumnAlreadyUsed(column.to_string()));
            }
        }
        let group = self
            .data
            .project(columns)
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        self.used.extend(columns.iter().cloned());
        Ok(group)
    }

    /// Claims `columns` and writes them to `<dir>/<name>.csv`.
    pub fn write_group(
        &mut self,
        dir: &Path,
        name: &str,
        columns: &[ColumnName],
    ) -> Result<PathBuf, PipelineError> {
        let group = self.take_group(columns)?;
        let path = dir.join(format!("{}.csv", sanitize(name)));
        let bytes = to_csv(&group)?;
        write_atomically(&path, &bytes).map_err(|source| PipelineError::SaveFailure {
            path: path.clone(),
            source,
        })?;
        log::info!("Wrote {} columns, {} rows to {}", columns.len(), group.len(), path.display());
        Ok(path)
    }
}

/// Serializes a data set as CSV with a header row. Missing cells are empty.
pub fn to_csv(data: &DataSet) -> Result<Vec<u8>, PipelineError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(data.columns().iter().map(ColumnName::as_str))?;
    for record in data.records() {
        let row = data.columns().iter().map(|column| {
            record
                .get(column.as_str())
                .and_then(|value| value.as_text())
                .unwrap_or_default()
        });
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| PipelineError::Io(e.into_error()))
}
