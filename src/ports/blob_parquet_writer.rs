//! Sink port that writes an Arrow table as one Parquet blob.

use crate::config::SinkPortConfig;
use crate::error::{PortError, PortResult};
use crate::io::blob::{self, BlobClient};
use crate::io::parquet::encode_parquet;
use crate::ports::{Port, SinkPort};
use arrow::record_batch::RecordBatch;

const PORT_NAME: &str = "blob-parquet-writer";

/// Encodes each written table as a complete Parquet file and uploads it to
/// `blob_path`, overwriting whatever is there.
pub struct BlobParquetWriter {
    config: SinkPortConfig,
    client: Option<Box<dyn BlobClient>>,
}

impl BlobParquetWriter {
    /// Connect to the endpoint named in `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no client handles the endpoint.
    pub fn new(config: SinkPortConfig) -> PortResult<Self> {
        let client = blob::connect(config.blob_storage())?;
        Ok(Self {
            config,
            client: Some(client),
        })
    }

    /// Use an already constructed client instead of connecting.
    pub fn with_client(config: SinkPortConfig, client: impl BlobClient + 'static) -> Self {
        Self {
            config,
            client: Some(Box::new(client)),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SinkPortConfig {
        &self.config
    }
}

impl Port for BlobParquetWriter {
    fn name(&self) -> &str {
        PORT_NAME
    }

    fn is_open(&self) -> bool {
        self.client.is_some()
    }

    fn close(&mut self) -> PortResult<()> {
        let Some(mut client) = self.client.take() else {
            return Ok(());
        };
        tracing::debug!(port = PORT_NAME, client = client.kind(), "closing blob client");
        client.close()
    }
}

impl SinkPort for BlobParquetWriter {
    type Item = RecordBatch;

    fn write(&mut self, table: RecordBatch) -> PortResult<()> {
        let client = self
            .client
            .as_deref()
            .ok_or_else(|| PortError::not_initialized(PORT_NAME))?;
        let container = self.config.blob_storage().container_name();
        let blob = self.config.blob_path();

        let bytes = encode_parquet(&table, self.config.compression())?;
        client.upload(container, blob, &bytes, true)?;
        tracing::info!(
            port = PORT_NAME,
            container,
            blob,
            rows = table.num_rows(),
            bytes = bytes.len(),
            compression = %self.config.compression(),
            "wrote Parquet blob"
        );
        Ok(())
    }
}
