use crate::error::SourceError;
use crate::RecordSource;
use formfill_types::{ColumnName, TabularRecord, Value};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A record source reading CSV text with a header row.
///
/// Cells are typed with [`Value::infer`]: missing markers become
/// `Value::Missing`, numeric text becomes `Value::Number`. Rows shorter than
/// the header are padded with `Missing`; surplus cells are dropped.
pub struct CsvRecordSource<R: Read + Send> {
    name: String,
    columns: Vec<ColumnName>,
    records: csv::StringRecordsIntoIter<R>,
    infer_numbers: bool,
}

impl CsvRecordSource<File> {
    /// Opens a CSV file and reads its header row.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(path.display().to_string(), file)
    }
}

impl<R: Read + Send> CsvRecordSource<R> {
    pub fn from_reader(name: impl Into<String>, reader: R) -> Result<Self, SourceError> {
        let name = name.into();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let columns = reader
            .headers()
            .map_err(|error| SourceError::Csv { source_name: name.clone(), error })?
            .iter()
            .map(ColumnName::from)
            .collect();
        Ok(Self { name, columns, records: reader.into_records(), infer_numbers: true })
    }

    /// Keeps every non-missing cell as text instead of parsing numbers.
    pub fn with_number_inference(mut self, infer_numbers: bool) -> Self {
        self.infer_numbers = infer_numbers;
        self
    }

    fn to_record(&self, row: &csv::StringRecord) -> TabularRecord {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let value = match row.get(i) {
                    None => Value::Missing,
                    Some(cell) if self.infer_numbers => Value::infer(cell),
                    Some(cell) => match Value::infer(cell) {
                        Value::Missing => Value::Missing,
                        _ => Value::String(cell.to_string()),
                    },
                };
                (column.clone(), value)
            })
            .collect()
    }
}

impl<R: Read + Send> RecordSource for CsvRecordSource<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    fn next_record(&mut self) -> Option<Result<TabularRecord, SourceError>> {
        let row = match self.records.next()? {
            Ok(row) => row,
            Err(error) => {
                return Some(Err(SourceError::Csv { source_name: self.name.clone(), error }));
            }
        };
        Some(Ok(self.to_record(&row)))
    }
}
