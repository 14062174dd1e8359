//! CSV decoding into an Arrow table.
//!
//! The whole blob is decoded in memory: the schema is inferred from every row
//! unless [`CsvOptions::infer_schema_rows`] caps it, the body is read in
//! `batch_size` chunks, and the chunks are concatenated into one
//! [`RecordBatch`] in arrival order.

use crate::config::CsvOptions;
use crate::error::{PortError, PortResult};
use arrow::compute::concat_batches;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::record_batch::RecordBatch;
use std::io::Cursor;
use std::sync::Arc;

/// Decode CSV bytes into a single table.
///
/// A blob holding only a header row yields a zero-row table with the header's
/// columns.
///
/// # Errors
///
/// Returns a serialization error if the input is empty, schema inference fails,
/// or any row cannot be decoded against the inferred schema.
pub fn decode_csv(bytes: &[u8], options: &CsvOptions) -> PortResult<RecordBatch> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(PortError::serialization("CSV input is empty"));
    }

    let format = Format::default()
        .with_header(options.has_header())
        .with_delimiter(options.delimiter());
    let (schema, sampled) = format
        .infer_schema(Cursor::new(bytes), options.infer_schema_rows())
        .map_err(|e| PortError::serialization("infer CSV schema").with_source(e.to_string()))?;
    let schema = Arc::new(schema);
    tracing::trace!(columns = schema.fields().len(), sampled, "inferred CSV schema");

    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(options.has_header())
        .with_delimiter(options.delimiter())
        .with_batch_size(options.batch_size())
        .build(Cursor::new(bytes))?;

    let mut batches = Vec::new();
    for (i, batch) in reader.enumerate() {
        let batch = batch.map_err(|e| {
            PortError::serialization(format!("decode CSV chunk #{}", i + 1))
                .with_source(e.to_string())
        })?;
        batches.push(batch);
    }

    Ok(concat_batches(&schema, &batches)?)
}
