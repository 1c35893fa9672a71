//! Record-set sources for the fill pipeline.
//!
//! This crate provides the `RecordSource` trait and the implementations
//! that feed tabular records into the merger.
//!
//! ## Available Sources
//!
//! - `VecRecordSource`: In-memory data set, useful for tests and embedding
//! - `CsvRecordSource`: Any `Read` carrying CSV text with a header row
//!
//! ## Example
//!
//! ```ignore
//! use formfill_source::{CsvRecordSource, RecordSource, RowSelection};
//!
//! let mut source = CsvRecordSource::from_path("people.csv")?;
//! let all = source.read_all()?;
//! let picked = RowSelection::parse("0, 2")?.apply(&all)?;
//! ```

mod csv_source;
mod error;
mod selection;

pub use csv_source::CsvRecordSource;
pub use error::SourceError;
pub use selection::RowSelection;

use formfill_types::{ColumnName, DataSet, TabularRecord};

/// A trait for sources that produce an ordered record set with a column schema.
///
/// The merger only ever sees fully materialised `DataSet`s, so most callers
/// go through [`RecordSource::read_all`]; `next_record` exists so that large
/// sources can be inspected without buffering everything.
pub trait RecordSource: Send {
    /// A human-readable label, typically the file path.
    fn name(&self) -> &str;

    /// The column schema, in declaration order.
    fn columns(&self) -> &[ColumnName];

    /// Get the next record, if available.
    ///
    /// Returns `None` when the source is exhausted.
    fn next_record(&mut self) -> Option<Result<TabularRecord, SourceError>>;

    /// Drains the remaining records into a `DataSet` with this source's schema.
    fn read_all(&mut self) -> Result<DataSet, SourceError> {
        let mut set = DataSet::new(self.columns().to_vec());
        while let Some(record) = self.next_record() {
            set.push(record?);
        }
        log::debug!("Read {} records from '{}'", set.len(), self.name());
        Ok(set)
    }
}

/// A record source backed by an in-memory data set.
pub struct VecRecordSource {
    name: String,
    data: DataSet,
    index: usize,
}

impl VecRecordSource {
    pub fn new(name: impl Into<String>, data: DataSet) -> Self {
        Self { name: name.into(), data, index: 0 }
    }
}

impl RecordSource for VecRecordSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn columns(&self) -> &[ColumnName] {
        self.data.columns()
    }

    fn next_record(&mut self) -> Option<Result<TabularRecord, SourceError>> {
        let record = self.data.get(self.index)?.clone();
        self.index += 1;
        Some(Ok(record))
    }
}
