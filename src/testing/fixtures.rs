//! Small tables and CSV payloads for tests.
//!
//! The tables are built with explicit Arrow arrays and use the same field
//! types CSV schema inference produces, so a fixture can be compared directly
//! with a decoded CSV blob.

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_arrow::schema::{SchemaLike, TracingOptions};
use serde_arrow::{from_record_batch, to_record_batch};
use std::sync::Arc;

/// CSV text for the two-row `id,name` table returned by [`people_batch`].
pub const PEOPLE_CSV: &str = "id,name\n1,Alice\n2,Bob\n";

/// [`PEOPLE_CSV`] as bytes.
#[must_use]
pub fn people_csv() -> Vec<u8> {
    PEOPLE_CSV.as_bytes().to_vec()
}

/// A two-row table: `id` (Int64) = [1, 2], `name` (Utf8) = ["Alice", "Bob"].
///
/// # Panics
///
/// Panics if the arrays do not match the schema, which cannot happen for these
/// constants.
///
/// # Example
///
/// ```
/// use seafarer::testing::people_batch;
///
/// let batch = people_batch();
/// assert_eq!(batch.num_rows(), 2);
/// assert_eq!(batch.schema().field(1).name(), "name");
/// ```
#[must_use]
pub fn people_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, true),
        Field::new("name", DataType::Utf8, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![1, 2])),
        Arc::new(StringArray::from(vec!["Alice", "Bob"])),
    ];
    RecordBatch::try_new(schema, columns).expect("people fixture matches its schema")
}

/// CSV text matching [`mixed_types_batch`].
pub const MIXED_TYPES_CSV: &str = "int,float,string,bool\n\
                                   1,1.5,alpha,true\n\
                                   -2,0.25,beta,false\n\
                                   30,-3.75,gamma,true\n";

/// A three-row table with one column per common scalar type:
/// `int` (Int64), `float` (Float64), `string` (Utf8) and `bool` (Boolean).
///
/// # Panics
///
/// Panics if the arrays do not match the schema, which cannot happen for these
/// constants.
#[must_use]
pub fn mixed_types_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("int", DataType::Int64, true),
        Field::new("float", DataType::Float64, true),
        Field::new("string", DataType::Utf8, true),
        Field::new("bool", DataType::Boolean, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![1, -2, 30])),
        Arc::new(Float64Array::from(vec![1.5, 0.25, -3.75])),
        Arc::new(StringArray::from(vec!["alpha", "beta", "gamma"])),
        Arc::new(BooleanArray::from(vec![true, false, true])),
    ];
    RecordBatch::try_new(schema, columns).expect("mixed-types fixture matches its schema")
}

/// Build a table from typed rows, with the schema traced from `T`.
///
/// Works for an empty `rows` slice as well.
///
/// # Errors
///
/// Returns an error if the schema cannot be traced from `T` or a row does not
/// fit it.
///
/// # Example
///
/// ```
/// use seafarer::testing::batch_from_rows;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Reading { sensor: u32, value: f64 }
///
/// let batch = batch_from_rows(&[Reading { sensor: 7, value: 0.5 }]).unwrap();
/// assert_eq!(batch.num_rows(), 1);
/// ```
pub fn batch_from_rows<T: Serialize + Deserialize<'static>>(rows: &[T]) -> Result<RecordBatch> {
    let fields = Vec::<FieldRef>::from_type::<T>(TracingOptions::default())
        .context("trace Arrow schema from row type")?;
    to_record_batch(&fields, &rows).context("convert rows to RecordBatch")
}

/// Read a table back into typed rows.
///
/// # Errors
///
/// Returns an error if a column is missing or has an incompatible type.
pub fn rows_from_batch<T: DeserializeOwned>(batch: &RecordBatch) -> Result<Vec<T>> {
    from_record_batch(batch).context("deserialize RecordBatch rows")
}
