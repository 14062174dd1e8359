//! Assertions for comparing tables.
//!
//! Tables are compared by column names, data types and values. Schema and field
//! metadata are ignored, since a Parquet round trip adds some of its own.

use arrow::record_batch::RecordBatch;

fn column_names(batch: &RecordBatch) -> Vec<String> {
    batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect()
}

/// Assert that two tables have the same columns (names and types, in order) and
/// the same values.
///
/// # Panics
///
/// Panics with a description of the first difference found.
///
/// # Example
///
/// ```
/// use seafarer::testing::{assert_tables_equal, people_batch};
///
/// assert_tables_equal(&people_batch(), &people_batch());
/// ```
pub fn assert_tables_equal(actual: &RecordBatch, expected: &RecordBatch) {
    assert_eq!(
        column_names(actual),
        column_names(expected),
        "Column mismatch:\n  Expected: {:?}\n  Actual: {:?}",
        column_names(expected),
        column_names(actual)
    );
    assert_eq!(
        actual.num_rows(),
        expected.num_rows(),
        "Row count mismatch:\n  Expected: {}\n  Actual: {}",
        expected.num_rows(),
        actual.num_rows()
    );

    let actual_schema = actual.schema();
    let expected_schema = expected.schema();
    for (i, (a, e)) in actual_schema
        .fields()
        .iter()
        .zip(expected_schema.fields().iter())
        .enumerate()
    {
        assert_eq!(
            a.data_type(),
            e.data_type(),
            "Type mismatch in column {i} ({}):\n  Expected: {}\n  Actual: {}",
            e.name(),
            e.data_type(),
            a.data_type()
        );
        assert_eq!(
            actual.column(i).to_data(),
            expected.column(i).to_data(),
            "Value mismatch in column {i} ({}):\n  Expected: {:?}\n  Actual: {:?}",
            e.name(),
            expected.column(i),
            actual.column(i)
        );
    }
}

/// Assert that a table has exactly the given column names, in order.
///
/// # Panics
///
/// Panics if the names differ.
pub fn assert_columns(batch: &RecordBatch, expected: &[&str]) {
    let actual = column_names(batch);
    assert_eq!(
        actual, expected,
        "Column mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}
