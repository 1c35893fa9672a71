//! Ordered records and the data sets that hold them.

use crate::error::TypesError;
use crate::ids::ColumnName;
use crate::value::Value;
use indexmap::IndexMap;

/// An ordered mapping of column name to value.
///
/// Insertion order is preserved so that merged records list their columns in
/// the order the sources declared them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularRecord {
    cells: IndexMap<ColumnName, Value>,
}

impl TabularRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a cell. An overwritten key keeps its position.
    pub fn insert(&mut self, column: impl Into<ColumnName>, value: impl Into<Value>) {
        self.cells.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// Copies every cell of `other` into `self`; `other` wins on collisions.
    pub fn overlay(&mut self, other: &TabularRecord) {
        for (column, value) in &other.cells {
            self.cells.insert(column.clone(), value.clone());
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnName> {
        self.cells.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnName, &Value)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<C: Into<ColumnName>, V: Into<Value>> FromIterator<(C, V)> for TabularRecord {
    fn from_iter<T: IntoIterator<Item = (C, V)>>(iter: T) -> Self {
        let mut record = TabularRecord::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

/// An ordered sequence of records sharing one column schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    columns: Vec<ColumnName>,
    records: Vec<TabularRecord>,
}

impl DataSet {
    pub fn new(columns: Vec<ColumnName>) -> Self {
        Self { columns, records: Vec::new() }
    }

    /// Builds a data set whose schema is the ordered union of the records' columns.
    pub fn from_records(records: Vec<TabularRecord>) -> Self {
        let mut columns: Vec<ColumnName> = Vec::new();
        for record in &records {
            for column in record.columns() {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }
        Self { columns, records }
    }

    /// Appends a record. Columns the schema does not know yet are added to it.
    pub fn push(&mut self, record: TabularRecord) {
        for column in record.columns() {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
            }
        }
        self.records.push(record);
    }

    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    pub fn records(&self) -> &[TabularRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&TabularRecord> {
        self.records.get(index)
    }

    pub fn into_records(self) -> Vec<TabularRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a new data set holding the given rows in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Result<DataSet, TypesError> {
        let records = indices
            .iter()
            .map(|&index| {
                self.records.get(index).cloned().ok_or(TypesError::RowOutOfRange {
                    index,
                    len: self.records.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DataSet { columns: self.columns.clone(), records })
    }

    /// Returns a new data set restricted to `columns`, in that order.
    pub fn project(&self, columns: &[ColumnName]) -> Result<DataSet, TypesError> {
        if let Some(unknown) = columns.iter().find(|c| !self.columns.contains(*c)) {
            return Err(TypesError::UnknownColumn(unknown.to_string()));
        }
        let records = self
            .records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| (c.clone(), record.get(c.as_str()).cloned().unwrap_or_default()))
                    .collect()
            })
            .collect();
        Ok(DataSet { columns: columns.to_vec(), records })
    }
}
