//! Combining several data sets into the one record set the renderer consumes.

use crate::error::PipelineError;
use formfill_types::{DataSet, TabularRecord, Value};
use serde::{Deserialize, Serialize};

/// How data sets are joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeMode {
    /// Every combination of one record from each input.
    #[default]
    CrossProduct,
    /// Record `i` of every input side by side, padding short inputs.
    ConcatAlign,
}

/// Merges `sets` under `mode`, failing with `EmptyMergeResult` when nothing comes out.
pub fn merge(sets: &[DataSet], mode: MergeMode) -> Result<DataSet, PipelineError> {
    let merged = match mode {
        MergeMode::CrossProduct => cross_product(sets),
        MergeMode::ConcatAlign => concat_align(sets),
    };
    log::info!(
        "Merged {} data sets ({:?}) into {} records",
        sets.len(),
        mode,
        merged.len()
    );
    if merged.is_empty() {
        return Err(PipelineError::EmptyMergeResult);
    }
    Ok(merged)
}

/// Cartesian product in odometer order: the first set varies slowest.
///
/// Each output record is the union of one record per input; when two inputs
/// share a column the later input's value wins. Any empty input, or no input
/// at all, yields an empty result.
pub fn cross_product(sets: &[DataSet]) -> DataSet {
    let mut out = DataSet::new(union_schema(sets));
    if sets.is_empty() || sets.iter().any(DataSet::is_empty) {
        return out;
    }

    let mut odometer = vec![0usize; sets.len()];
    loop {
        let mut record = TabularRecord::new();
        for (set, &row) in sets.iter().zip(&odometer) {
            record.overlay(&set.records()[row]);
        }
        out.push(record);

        // Advance the rightmost wheel, carrying leftwards.
        let mut wheel = sets.len();
        loop {
            if wheel == 0 {
                return out;
            }
            wheel -= 1;
            odometer[wheel] += 1;
            if odometer[wheel] < sets[wheel].len() {
                break;
            }
            odometer[wheel] = 0;
        }
    }
}

/// Index-aligned union. The result has as many records as the longest input.
///
/// Past its own length an input contributes `Missing` for each of its columns,
/// but padding never replaces a value an earlier input already supplied.
/// Present values from later inputs overwrite earlier ones.
pub fn concat_align(sets: &[DataSet]) -> DataSet {
    let mut out = DataSet::new(union_schema(sets));
    let rows = sets.iter().map(DataSet::len).max().unwrap_or(0);

    for i in 0..rows {
        let mut record = TabularRecord::new();
        for set in sets {
            match set.get(i) {
                Some(row) => record.overlay(row),
                None => {
                    for column in set.columns() {
                        if !record.contains(column.as_str()) {
                            record.insert(column.clone(), Value::Missing);
                        }
                    }
                }
            }
        }
        out.push(record);
    }
    out
}

fn union_schema(sets: &[DataSet]) -> Vec<formfill_types::ColumnName> {
    let mut columns = Vec::new();
    for column in sets.iter().flat_map(|s| s.columns()) {
        if !columns.contains(column) {
            columns.push(column.clone());
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use formfill_types::ColumnName;

    fn set(column: &str, values: &[&str]) -> DataSet {
        let mut data = DataSet::new(vec![ColumnName::new(column)]);
        for v in values {
            data.push([(column, *v)].into_iter().collect());
        }
        data
    }

    fn column_values(data: &DataSet, column: &str) -> Vec<String> {
        data.records()
            .iter()
            .map(|r| r.get(column).map(|v| v.to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_cross_product_odometer_order() {
        let names = set("Name", &["Alice", "Bob"]);
        let dates = set("Date", &["2024-01-01", "2024-02-02", "2024-03-03"]);
        let merged = cross_product(&[names, dates]);

        assert_eq!(merged.len(), 6);
        assert_eq!(
            column_values(&merged, "Name"),
            vec!["Alice", "Alice", "Alice", "Bob", "Bob", "Bob"]
        );
        assert_eq!(
            column_values(&merged, "Date"),
            vec!["2024-01-01", "2024-02-02", "2024-03-03", "2024-01-01", "2024-02-02", "2024-03-03"]
        );
        assert!(merged.records().iter().all(|r| r.len() == 2));
    }

    #[test]
    fn test_cross_product_size_is_product_of_sizes() {
        for sizes in [vec![1], vec![2, 3], vec![3, 1, 4], vec![2, 2, 2, 2]] {
            let sets: Vec<DataSet> = sizes
                .iter()
                .enumerate()
                .map(|(i, &n)| {
                    let values: Vec<String> = (0..n).map(|v| v.to_string()).collect();
                    let refs: Vec<&str> = values.iter().map(String::as_str).collect();
                    set(&format!("c{i}"), &refs)
                })
                .collect();
            let merged = cross_product(&sets);
            assert_eq!(merged.len(), sizes.iter().product::<usize>());
            assert!(merged.records().iter().all(|r| r.len() == sizes.len()));
        }
    }

    #[test]
    fn test_cross_product_with_empty_input_is_empty() {
        let merged = cross_product(&[set("A", &["x"]), set("B", &[])]);
        assert!(merged.is_empty());
        assert!(cross_product(&[]).is_empty());
    }

    #[test]
    fn test_cross_product_later_input_wins_on_shared_column() {
        let merged = cross_product(&[set("K", &["left"]), set("K", &["right"])]);
        assert_eq!(column_values(&merged, "K"), vec!["right"]);
    }

    #[test]
    fn test_concat_align_pads_short_inputs() {
        let names = set("Name", &["Alice", "Bob"]);
        let dates = set("Date", &["2024-01-01"]);
        let merged = concat_align(&[names, dates]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.records()[0].get("Date"), Some(&Value::from("2024-01-01")));
        assert_eq!(merged.records()[1].get("Name"), Some(&Value::from("Bob")));
        assert_eq!(merged.records()[1].get("Date"), Some(&Value::Missing));
    }

    #[test]
    fn test_concat_align_size_is_max() {
        let merged = concat_align(&[set("A", &["1"]), set("B", &["1", "2", "3"]), set("C", &[])]);
        assert_eq!(merged.len(), 3);
        assert!(merged.records().iter().all(|r| r.len() == 3));
        assert_eq!(merged.records()[2].get("A"), Some(&Value::Missing));
        assert_eq!(merged.records()[0].get("C"), Some(&Value::Missing));
    }

    #[test]
    fn test_concat_align_collisions() {
        let merged = concat_align(&[set("K", &["a", "b"]), set("K", &["z"])]);
        assert_eq!(merged.records()[0].get("K"), Some(&Value::from("z")));
        assert_eq!(merged.records()[1].get("K"), Some(&Value::from("b")));
    }

    #[test]
    fn test_merge_reports_empty_result() {
        let result = merge(&[set("A", &[]), set("B", &["x"])], MergeMode::CrossProduct);
        assert!(matches!(result, Err(PipelineError::EmptyMergeResult)));
        let result = merge(&[set("A", &[])], MergeMode::ConcatAlign);
        assert!(matches!(result, Err(PipelineError::EmptyMergeResult)));
    }
}
