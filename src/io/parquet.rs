//! Parquet encoding and decoding of whole tables in memory.
//!
//! [`encode_parquet`] is what the sink uploads; [`decode_parquet`] reads such a
//! buffer back into one table, which is how tests check that column values and
//! types survive the trip.

use crate::config::ParquetCompression;
use crate::error::{PortError, PortResult};
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;

impl From<ParquetCompression> for Compression {
    fn from(c: ParquetCompression) -> Self {
        match c {
            ParquetCompression::Uncompressed => Compression::UNCOMPRESSED,
            ParquetCompression::Snappy => Compression::SNAPPY,
            ParquetCompression::Gzip => Compression::GZIP(GzipLevel::default()),
            ParquetCompression::Zstd => Compression::ZSTD(ZstdLevel::default()),
        }
    }
}

/// Encode a table as a complete Parquet file.
///
/// A zero-row table still produces a valid file carrying the schema.
///
/// # Errors
///
/// Returns a serialization error if the writer cannot be created or the batch
/// cannot be written.
pub fn encode_parquet(batch: &RecordBatch, compression: ParquetCompression) -> PortResult<Vec<u8>> {
    let props = WriterProperties::builder()
        .set_compression(compression.into())
        .build();
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), Some(props))
        .map_err(|e| PortError::serialization("create ArrowWriter").with_source(e.to_string()))?;
    writer
        .write(batch)
        .map_err(|e| PortError::serialization("write batch to parquet").with_source(e.to_string()))?;
    writer
        .close()
        .map_err(|e| PortError::serialization("close ArrowWriter").with_source(e.to_string()))?;
    Ok(buffer)
}

/// Decode a Parquet file held in memory into one table.
///
/// # Errors
///
/// Returns a serialization error if the bytes are not a Parquet file or a
/// batch cannot be read.
pub fn decode_parquet(bytes: impl Into<Bytes>) -> PortResult<RecordBatch> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes.into()).map_err(|e| {
        PortError::serialization("open ParquetRecordBatchReader").with_source(e.to_string())
    })?;
    let schema = builder.schema().clone();
    let reader = builder.with_batch_size(64 * 1024).build()?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    Ok(concat_batches(&schema, &batches)?)
}
