#![cfg(feature = "io-parquet")]

use seafarer::config::ParquetCompression;
use seafarer::testing::*;
use seafarer::{ErrorKind, decode_parquet, encode_parquet};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Reading {
    sensor: u32,
    site: String,
    value: Option<f64>,
    healthy: bool,
}

fn readings() -> Vec<Reading> {
    vec![
        Reading {
            sensor: 1,
            site: "north".into(),
            value: Some(12.5),
            healthy: true,
        },
        Reading {
            sensor: 2,
            site: "south".into(),
            value: None,
            healthy: false,
        },
    ]
}

#[test]
fn parquet_preserves_types_and_values() -> anyhow::Result<()> {
    let bytes = encode_parquet(&mixed_types_batch(), ParquetCompression::default())?;
    assert!(bytes.starts_with(b"PAR1"));

    let back = decode_parquet(bytes)?;
    assert_tables_equal(&back, &mixed_types_batch());
    Ok(())
}

#[test]
fn parquet_every_compression_decodes() -> anyhow::Result<()> {
    for compression in [
        ParquetCompression::Uncompressed,
        ParquetCompression::Snappy,
        ParquetCompression::Gzip,
        ParquetCompression::Zstd,
    ] {
        let bytes = encode_parquet(&people_batch(), compression)?;
        assert_tables_equal(&decode_parquet(bytes)?, &people_batch());
    }
    Ok(())
}

#[test]
fn parquet_typed_rows_with_nulls() -> anyhow::Result<()> {
    let batch = batch_from_rows(&readings())?;
    let back = decode_parquet(encode_parquet(&batch, ParquetCompression::Zstd)?)?;

    let rows: Vec<Reading> = rows_from_batch(&back)?;
    assert_eq!(rows, readings());
    Ok(())
}

#[test]
fn parquet_zero_row_table_keeps_schema() -> anyhow::Result<()> {
    let empty = people_batch().slice(0, 0);
    let back = decode_parquet(encode_parquet(&empty, ParquetCompression::Snappy)?)?;

    assert_eq!(back.num_rows(), 0);
    assert_columns(&back, &["id", "name"]);
    Ok(())
}

#[test]
fn parquet_garbage_is_serialization_error() {
    let err = decode_parquet(b"definitely not parquet".to_vec()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Serialization);
}
