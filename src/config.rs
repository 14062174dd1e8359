//! Immutable configuration values for ports and pipelines.
//!
//! Every config type validates itself at construction and exposes getters
//! only, so a value cannot change once a port has been built from it. All
//! validation failures are [`ErrorKind::Configuration`] errors and are raised
//! before any client is created.
//!
//! A whole pipeline can also be described in JSON:
//!
//! ```
//! use seafarer::config::PipelineConfig;
//!
//! let cfg = PipelineConfig::from_json_str(r#"{
//!     "source": {
//!         "blob_storage": {
//!             "connection_string": "AccountName=dev;AccountKey=a2V5;BlobEndpoint=file:///tmp/blobs;",
//!             "container_name": "source-container"
//!         },
//!         "blob_path": "data/input.csv"
//!     },
//!     "sink": {
//!         "blob_storage": {
//!             "account_name": "dev",
//!             "account_key": "a2V5",
//!             "endpoint": "file:///tmp/blobs",
//!             "container_name": "sink-container"
//!         },
//!         "blob_path": "data/output.parquet",
//!         "compression": "zstd"
//!     }
//! }"#)?;
//! assert_eq!(cfg.batch_size(), 1000);
//! # Ok::<(), seafarer::PortError>(())
//! ```

use crate::error::{ErrorKind, PortError, PortResult};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

// ============================================================================
// Blob storage connection
// ============================================================================

/// Connection parameters for one blob storage container.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawBlobStorageConfig")]
pub struct BlobStorageConfig {
    account_name: String,
    account_key: String,
    endpoint: String,
    container_name: String,
}

impl BlobStorageConfig {
    /// Build a config from endpoint and account credentials.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any field is empty, the endpoint has no
    /// `scheme://` prefix, or the container name is not a valid container name.
    pub fn new(
        account_name: impl Into<String>,
        account_key: impl Into<String>,
        endpoint: impl Into<String>,
        container_name: impl Into<String>,
    ) -> PortResult<Self> {
        let cfg = Self {
            account_name: account_name.into(),
            account_key: account_key.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            container_name: container_name.into(),
        };
        require_non_empty("account_name", &cfg.account_name)?;
        require_non_empty("account_key", &cfg.account_key)?;
        require_non_empty("endpoint", &cfg.endpoint)?;
        endpoint_scheme(&cfg.endpoint)?;
        validate_container_name(&cfg.container_name)?;
        Ok(cfg)
    }

    /// Parse a `Key=Value;` storage connection string.
    ///
    /// Recognised keys are `DefaultEndpointsProtocol`, `AccountName`,
    /// `AccountKey`, `BlobEndpoint` and `EndpointSuffix`; anything else is
    /// ignored. Without `BlobEndpoint` the endpoint is derived from the
    /// protocol, account name and suffix.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed segments or missing
    /// account parameters, and everything [`BlobStorageConfig::new`] rejects.
    pub fn from_connection_string(
        connection_string: &str,
        container_name: impl Into<String>,
    ) -> PortResult<Self> {
        let mut protocol = None;
        let mut account_name = None;
        let mut account_key = None;
        let mut blob_endpoint = None;
        let mut suffix = None;

        for segment in connection_string.split(';').map(str::trim) {
            if segment.is_empty() {
                continue;
            }
            // Account keys are base64 and may end in '=', so split on the first one only.
            let Some((key, value)) = segment.split_once('=') else {
                return Err(PortError::configuration(format!(
                    "malformed connection string segment '{segment}'"
                )));
            };
            let value = value.trim().to_string();
            match key.trim() {
                "DefaultEndpointsProtocol" => protocol = Some(value),
                "AccountName" => account_name = Some(value),
                "AccountKey" => account_key = Some(value),
                "BlobEndpoint" => blob_endpoint = Some(value),
                "EndpointSuffix" => suffix = Some(value),
                _ => {}
            }
        }

        let account_name = account_name
            .ok_or_else(|| PortError::configuration("connection string is missing AccountName"))?;
        let account_key = account_key
            .ok_or_else(|| PortError::configuration("connection string is missing AccountKey"))?;
        let endpoint = blob_endpoint.unwrap_or_else(|| {
            format!(
                "{}://{}.blob.{}",
                protocol.as_deref().unwrap_or("https"),
                account_name,
                suffix.as_deref().unwrap_or(DEFAULT_ENDPOINT_SUFFIX)
            )
        });

        Self::new(account_name, account_key, endpoint, container_name)
    }

    /// Render the equivalent connection string.
    ///
    /// The protocol is taken from the endpoint scheme; nothing is specific to
    /// any emulator.
    #[must_use]
    pub fn connection_string(&self) -> String {
        format!(
            "DefaultEndpointsProtocol={};AccountName={};AccountKey={};BlobEndpoint={};",
            self.scheme(),
            self.account_name,
            self.account_key,
            self.endpoint
        )
    }

    #[must_use]
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    #[must_use]
    pub fn account_key(&self) -> &str {
        &self.account_key
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    /// Lowercased endpoint scheme (`https`, `http`, `file`, `memory`, ...).
    #[must_use]
    pub fn scheme(&self) -> String {
        // Validated in `new`, so the separator is always present.
        self.endpoint
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

impl fmt::Debug for BlobStorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobStorageConfig")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("container_name", &self.container_name)
            .finish()
    }
}

/// Either explicit credentials or a connection string, as accepted in JSON.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBlobStorageConfig {
    Explicit {
        account_name: String,
        account_key: String,
        endpoint: String,
        container_name: String,
    },
    ConnectionString {
        connection_string: String,
        container_name: String,
    },
}

impl TryFrom<RawBlobStorageConfig> for BlobStorageConfig {
    type Error = PortError;

    fn try_from(raw: RawBlobStorageConfig) -> PortResult<Self> {
        match raw {
            RawBlobStorageConfig::Explicit {
                account_name,
                account_key,
                endpoint,
                container_name,
            } => Self::new(account_name, account_key, endpoint, container_name),
            RawBlobStorageConfig::ConnectionString {
                connection_string,
                container_name,
            } => Self::from_connection_string(&connection_string, container_name),
        }
    }
}

fn require_non_empty(field: &str, value: &str) -> PortResult<()> {
    if value.trim().is_empty() {
        return Err(PortError::configuration(format!("{field} must not be empty")));
    }
    Ok(())
}

fn endpoint_scheme(endpoint: &str) -> PortResult<&str> {
    match endpoint.split_once("://") {
        Some((scheme, rest))
            if !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                && !rest.is_empty() =>
        {
            Ok(scheme)
        }
        _ => Err(PortError::configuration(format!(
            "endpoint '{endpoint}' is not a URL of the form scheme://host[/path]"
        ))),
    }
}

/// Container names: 3-63 chars of lowercase letters, digits and single
/// hyphens, starting and ending with a letter or digit.
fn validate_container_name(name: &str) -> PortResult<()> {
    let invalid = |reason: &str| {
        Err(PortError::configuration(format!(
            "invalid container name '{name}': {reason}"
        )))
    };
    if !(3..=63).contains(&name.len()) {
        return invalid("length must be between 3 and 63");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return invalid("only lowercase letters, digits and '-' are allowed");
    }
    if name.starts_with('-') || name.ends_with('-') {
        return invalid("must start and end with a letter or digit");
    }
    if name.contains("--") {
        return invalid("consecutive hyphens are not allowed");
    }
    Ok(())
}

fn validate_blob_path(path: &str) -> PortResult<()> {
    require_non_empty("blob_path", path)?;
    if path.starts_with('/') {
        return Err(PortError::configuration(format!(
            "blob_path '{path}' must be relative to the container"
        )));
    }
    if path.split('/').any(|part| part == "..") {
        return Err(PortError::configuration(format!(
            "blob_path '{path}' must not contain '..'"
        )));
    }
    Ok(())
}

// ============================================================================
// Serialization options
// ============================================================================

/// How the CSV source decodes its blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawCsvOptions")]
pub struct CsvOptions {
    delimiter: char,
    has_header: bool,
    /// Rows sampled for schema inference; `None` reads the whole blob.
    infer_schema_rows: Option<usize>,
    batch_size: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_header: true,
            infer_schema_rows: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl CsvOptions {
    /// # Errors
    ///
    /// Returns a configuration error if the delimiter is not a single ASCII character.
    pub fn with_delimiter(self, delimiter: char) -> PortResult<Self> {
        let cfg = Self { delimiter, ..self };
        cfg.validate()?;
        Ok(cfg)
    }

    #[must_use]
    pub fn with_header(self, has_header: bool) -> Self {
        Self { has_header, ..self }
    }

    /// Limit schema inference to the first `rows` records. `None` scans the whole blob.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for `Some(0)`.
    pub fn with_infer_schema_rows(self, rows: Option<usize>) -> PortResult<Self> {
        let cfg = Self {
            infer_schema_rows: rows,
            ..self
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns a configuration error if `batch_size` is zero.
    pub fn with_batch_size(self, batch_size: usize) -> PortResult<Self> {
        let cfg = Self { batch_size, ..self };
        cfg.validate()?;
        Ok(cfg)
    }

    /// The delimiter as a single byte (always ASCII after validation).
    #[must_use]
    pub fn delimiter(&self) -> u8 {
        // Non-ASCII delimiters are rejected by `validate`.
        u8::try_from(self.delimiter).unwrap_or(b',')
    }

    #[must_use]
    pub fn has_header(&self) -> bool {
        self.has_header
    }

    #[must_use]
    pub fn infer_schema_rows(&self) -> Option<usize> {
        self.infer_schema_rows
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn validate(&self) -> PortResult<()> {
        if !self.delimiter.is_ascii() || self.delimiter == '\n' || self.delimiter == '\r' {
            return Err(PortError::configuration(format!(
                "CSV delimiter {:?} must be a single ASCII character other than a line break",
                self.delimiter
            )));
        }
        if self.batch_size == 0 {
            return Err(PortError::configuration("batch_size must be greater than 0"));
        }
        if self.infer_schema_rows == Some(0) {
            return Err(PortError::configuration(
                "infer_schema_rows must be greater than 0 (omit it to scan the whole blob)",
            ));
        }
        Ok(())
    }
}

/// `CsvOptions` as written in JSON; every field is optional.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCsvOptions {
    delimiter: Option<char>,
    has_header: Option<bool>,
    infer_schema_rows: Option<usize>,
    batch_size: Option<usize>,
}

impl TryFrom<RawCsvOptions> for CsvOptions {
    type Error = PortError;

    fn try_from(raw: RawCsvOptions) -> PortResult<Self> {
        let defaults = Self::default();
        let cfg = Self {
            delimiter: raw.delimiter.unwrap_or(defaults.delimiter),
            has_header: raw.has_header.unwrap_or(defaults.has_header),
            infer_schema_rows: raw.infer_schema_rows,
            batch_size: raw.batch_size.unwrap_or(defaults.batch_size),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Column chunk compression for the Parquet sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum ParquetCompression {
    Uncompressed,
    #[default]
    Snappy,
    Gzip,
    Zstd,
}

impl FromStr for ParquetCompression {
    type Err = PortError;

    fn from_str(s: &str) -> PortResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "uncompressed" => Ok(Self::Uncompressed),
            "snappy" => Ok(Self::Snappy),
            "gzip" | "gz" => Ok(Self::Gzip),
            "zstd" | "zst" => Ok(Self::Zstd),
            other => Err(PortError::configuration(format!(
                "unknown parquet compression '{other}' (expected none, snappy, gzip or zstd)"
            ))),
        }
    }
}

impl TryFrom<String> for ParquetCompression {
    type Error = PortError;

    fn try_from(s: String) -> PortResult<Self> {
        s.parse()
    }
}

impl fmt::Display for ParquetCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uncompressed => "none",
            Self::Snappy => "snappy",
            Self::Gzip => "gzip",
            Self::Zstd => "zstd",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Port configs
// ============================================================================

/// Configuration of the CSV source port.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSourcePortConfig")]
pub struct SourcePortConfig {
    blob_storage: BlobStorageConfig,
    blob_path: String,
    csv: CsvOptions,
}

impl SourcePortConfig {
    /// # Errors
    ///
    /// Returns a configuration error if `blob_path` is empty, absolute or escapes the container.
    pub fn new(blob_storage: BlobStorageConfig, blob_path: impl Into<String>) -> PortResult<Self> {
        let blob_path = blob_path.into();
        validate_blob_path(&blob_path)?;
        Ok(Self {
            blob_storage,
            blob_path,
            csv: CsvOptions::default(),
        })
    }

    #[must_use]
    pub fn with_csv_options(self, csv: CsvOptions) -> Self {
        Self { csv, ..self }
    }

    #[must_use]
    pub fn blob_storage(&self) -> &BlobStorageConfig {
        &self.blob_storage
    }

    #[must_use]
    pub fn blob_path(&self) -> &str {
        &self.blob_path
    }

    #[must_use]
    pub fn csv(&self) -> &CsvOptions {
        &self.csv
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSourcePortConfig {
    blob_storage: BlobStorageConfig,
    blob_path: String,
    #[serde(default)]
    csv: CsvOptions,
}

impl TryFrom<RawSourcePortConfig> for SourcePortConfig {
    type Error = PortError;

    fn try_from(raw: RawSourcePortConfig) -> PortResult<Self> {
        Ok(Self::new(raw.blob_storage, raw.blob_path)?.with_csv_options(raw.csv))
    }
}

/// Configuration of the Parquet sink port.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSinkPortConfig")]
pub struct SinkPortConfig {
    blob_storage: BlobStorageConfig,
    blob_path: String,
    compression: ParquetCompression,
}

impl SinkPortConfig {
    /// # Errors
    ///
    /// Returns a configuration error if `blob_path` is empty, absolute or escapes the container.
    pub fn new(blob_storage: BlobStorageConfig, blob_path: impl Into<String>) -> PortResult<Self> {
        let blob_path = blob_path.into();
        validate_blob_path(&blob_path)?;
        Ok(Self {
            blob_storage,
            blob_path,
            compression: ParquetCompression::default(),
        })
    }

    #[must_use]
    pub fn with_compression(self, compression: ParquetCompression) -> Self {
        Self {
            compression,
            ..self
        }
    }

    #[must_use]
    pub fn blob_storage(&self) -> &BlobStorageConfig {
        &self.blob_storage
    }

    #[must_use]
    pub fn blob_path(&self) -> &str {
        &self.blob_path
    }

    #[must_use]
    pub fn compression(&self) -> ParquetCompression {
        self.compression
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSinkPortConfig {
    blob_storage: BlobStorageConfig,
    blob_path: String,
    #[serde(default)]
    compression: ParquetCompression,
}

impl TryFrom<RawSinkPortConfig> for SinkPortConfig {
    type Error = PortError;

    fn try_from(raw: RawSinkPortConfig) -> PortResult<Self> {
        Ok(Self::new(raw.blob_storage, raw.blob_path)?.with_compression(raw.compression))
    }
}

// ============================================================================
// Pipeline config
// ============================================================================

/// A complete CSV-to-Parquet run: one source, one sink, and the decode batch size.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawPipelineConfig")]
pub struct PipelineConfig {
    source: SourcePortConfig,
    sink: SinkPortConfig,
    batch_size: usize,
}

impl PipelineConfig {
    /// Combine a source and sink config. The batch size is the source's CSV batch size.
    #[must_use]
    pub fn new(source: SourcePortConfig, sink: SinkPortConfig) -> Self {
        let batch_size = source.csv.batch_size();
        Self {
            source,
            sink,
            batch_size,
        }
    }

    /// Override the batch size (also applied to the source's CSV decoding).
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `batch_size` is zero.
    pub fn with_batch_size(self, batch_size: usize) -> PortResult<Self> {
        let csv = self.source.csv.with_batch_size(batch_size)?;
        Ok(Self {
            source: self.source.with_csv_options(csv),
            sink: self.sink,
            batch_size,
        })
    }

    /// Parse and validate a JSON pipeline description.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the document is malformed or any value fails validation.
    pub fn from_json_str(json: &str) -> PortResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            PortError::new(ErrorKind::Configuration, "invalid pipeline config")
                .with_source(e.to_string())
        })
    }

    /// Read and validate a JSON pipeline description from disk.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or fails validation.
    pub fn from_path(path: impl AsRef<Path>) -> PortResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PortError::new(
                ErrorKind::Configuration,
                format!("read pipeline config {}", path.display()),
            )
            .with_source(e.to_string())
        })?;
        Self::from_json_str(&json)
    }

    #[must_use]
    pub fn source(&self) -> &SourcePortConfig {
        &self.source
    }

    #[must_use]
    pub fn sink(&self) -> &SinkPortConfig {
        &self.sink
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPipelineConfig {
    source: SourcePortConfig,
    sink: SinkPortConfig,
    /// Overrides `source.csv.batch_size` only when present.
    batch_size: Option<usize>,
}

impl TryFrom<RawPipelineConfig> for PipelineConfig {
    type Error = PortError;

    fn try_from(raw: RawPipelineConfig) -> PortResult<Self> {
        let cfg = Self::new(raw.source, raw.sink);
        match raw.batch_size {
            Some(batch_size) => cfg.with_batch_size(batch_size),
            None => Ok(cfg),
        }
    }
}
