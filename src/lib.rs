//! # Seafarer
//!
//! A small **hexagonal data pipeline** that reads a CSV blob from blob storage,
//! optionally transforms it, and writes it back as a Parquet blob.
//!
//! The core knows nothing about storage or file formats. It talks to two
//! ports:
//!
//! - a [`SourcePort`] that yields a sequence of items, and
//! - a [`SinkPort`] that accepts items one at a time.
//!
//! Adapters bind those ports to concrete technology. The shipped adapters,
//! [`BlobCsvReader`] and [`BlobParquetWriter`], move Arrow
//! [`RecordBatch`](arrow::record_batch::RecordBatch)es between blob storage and
//! CSV/Parquet encodings.
//!
//! ## Key Features
//!
//! - **Port contract** - every port has an explicit, idempotent `close`, scoped
//!   acquisition via [`PortScope`], and a distinct "not initialized" error after
//!   close
//! - **Always closes** - a [`Pipeline`] closes its sink and then its source on
//!   every exit path, and reports the loop error ahead of any close error
//! - **Immutable config** - validated once on construction, loadable from JSON
//! - **Pluggable storage** - Azure Blob Storage (or an emulator), local
//!   directories and an in-memory store ship in the crate; any other backend
//!   implements [`BlobClient`](io::blob::BlobClient)
//!
//! ## Quick Start
//!
//! ```
//! use seafarer::config::{BlobStorageConfig, PipelineConfig, SinkPortConfig, SourcePortConfig};
//! use seafarer::io::blob::MemoryBlobStore;
//! use seafarer::pipeline::csv_to_parquet;
//!
//! # fn main() -> anyhow::Result<()> {
//! let store = MemoryBlobStore::shared("lib-quick-start");
//! store.insert("data", "in/people.csv", b"id,name\n1,Alice\n2,Bob\n".to_vec());
//!
//! let storage = BlobStorageConfig::new("dev", "a2V5", "memory://lib-quick-start", "data")?;
//! let config = PipelineConfig::new(
//!     SourcePortConfig::new(storage.clone(), "in/people.csv")?,
//!     SinkPortConfig::new(storage, "out/people.parquet")?,
//! );
//!
//! let report = csv_to_parquet(&config)?.run()?;
//! assert_eq!(report.items, 1);
//! assert!(store.get("data", "out/people.parquet").is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `io-csv` - CSV decoding and the [`BlobCsvReader`] source
//! - `io-parquet` - Parquet encoding and the [`BlobParquetWriter`] sink
//! - `azure` - `http://` and `https://` endpoints through `object_store`
//!
//! All three are on by default. The `seafarer` binary needs the first two.
//!
//! ## Module Overview
//!
//! - [`config`] - Immutable storage, port and pipeline configuration
//! - [`error`] - The port error type and its kinds
//! - [`ports`] - Port traits, scoped acquisition and the blob adapters
//! - [`pipeline`] - The read, transform, write orchestrator
//! - [`io`] - Blob clients and the CSV/Parquet codecs
//! - [`testing`] - In-memory ports, fixtures and table assertions

pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod ports;
pub mod testing;

// General re-exports
pub use error::{ErrorKind, PortError, PortResult};
pub use pipeline::{Pipeline, PipelineState, RunReport};
pub use ports::{Port, PortScope, SinkPort, SourcePort};

// Gated re-exports
#[cfg(feature = "io-csv")]
pub use io::csv::decode_csv;

#[cfg(feature = "io-csv")]
pub use ports::BlobCsvReader;

#[cfg(feature = "io-parquet")]
pub use io::parquet::{decode_parquet, encode_parquet};

#[cfg(feature = "io-parquet")]
pub use ports::BlobParquetWriter;

#[cfg(all(feature = "io-csv", feature = "io-parquet"))]
pub use pipeline::csv_to_parquet;
