//! Source port that reads one CSV blob into an Arrow table.

use crate::config::SourcePortConfig;
use crate::error::{PortError, PortResult};
use crate::io::blob::{self, BlobClient};
use crate::io::csv::decode_csv;
use crate::ports::{Batches, Port, SourcePort};
use arrow::record_batch::RecordBatch;

const PORT_NAME: &str = "blob-csv-reader";

/// Reads `blob_path` from the configured container and yields it as a single
/// [`RecordBatch`].
///
/// The port works the same against a hosted account, an emulator, a local
/// directory or an in-memory store; only the client differs.
pub struct BlobCsvReader {
    config: SourcePortConfig,
    client: Option<Box<dyn BlobClient>>,
}

impl BlobCsvReader {
    /// Connect to the endpoint named in `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no client handles the endpoint.
    pub fn new(config: SourcePortConfig) -> PortResult<Self> {
        let client = blob::connect(config.blob_storage())?;
        Ok(Self {
            config,
            client: Some(client),
        })
    }

    /// Use an already constructed client instead of connecting.
    pub fn with_client(config: SourcePortConfig, client: impl BlobClient + 'static) -> Self {
        Self {
            config,
            client: Some(Box::new(client)),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SourcePortConfig {
        &self.config
    }

    fn fetch(&self) -> PortResult<RecordBatch> {
        let client = self
            .client
            .as_deref()
            .ok_or_else(|| PortError::not_initialized(PORT_NAME))?;
        let container = self.config.blob_storage().container_name();
        let blob = self.config.blob_path();

        let bytes = client.download(container, blob)?;
        let table = decode_csv(&bytes, self.config.csv()).map_err(|e| {
            let message = format!("{container}/{blob}: {}", e.message);
            PortError { message, ..e }
        })?;
        tracing::info!(
            port = PORT_NAME,
            container,
            blob,
            bytes = bytes.len(),
            rows = table.num_rows(),
            columns = table.num_columns(),
            "read CSV blob"
        );
        Ok(table)
    }
}

impl Port for BlobCsvReader {
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

impl SourcePort for BlobCsvReader {
    type Item = RecordBatch;

    /// Yields exactly one table. The download happens when the sequence is
    /// first advanced, not when `read` is called.
    fn read(&mut self) -> PortResult<Batches<'_, RecordBatch>> {
        if self.client.is_none() {
            return Err(PortError::not_initialized(PORT_NAME));
        }
        let this: &Self = self;
        Ok(Box::new(std::iter::once_with(move || this.fetch())))
    }
}
