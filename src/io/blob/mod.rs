//! Blob storage boundary.
//!
//! Ports talk to storage only through the [`BlobClient`] trait. These clients
//! ship with the crate:
//!
//! - [`MemoryBlobStore`] - in-process containers, for tests and `memory://<name>` endpoints
//! - [`LocalBlobStore`] - a directory tree, for `file:///path` endpoints
//! - `RemoteBlobStore` - Azure Blob Storage or an emulator, for `https://` and
//!   `http://` endpoints (`azure` feature)
//!
//! [`connect`] picks one from a [`BlobStorageConfig`]. Any other
//! [`BlobClient`] can be handed to a port with `with_client`.

pub mod local;
pub mod memory;
#[cfg_attr(docsrs, doc(cfg(feature = "azure")))]
#[cfg(feature = "azure")]
pub mod remote;
pub mod traits;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
#[cfg(feature = "azure")]
pub use remote::RemoteBlobStore;
pub use traits::BlobClient;

use crate::config::BlobStorageConfig;
use crate::error::{PortError, PortResult};

/// Open the client that serves `config`'s endpoint.
///
/// # Errors
///
/// Returns a configuration error if no client in this build handles the
/// endpoint scheme.
pub fn connect(config: &BlobStorageConfig) -> PortResult<Box<dyn BlobClient>> {
    let scheme = config.scheme();
    let client: Box<dyn BlobClient> = match scheme.as_str() {
        "file" => Box::new(LocalBlobStore::from_endpoint(config.endpoint())?),
        "memory" => {
            let name = config
                .endpoint()
                .strip_prefix("memory://")
                .unwrap_or_default();
            Box::new(MemoryBlobStore::shared(name))
        }
        #[cfg(feature = "azure")]
        "http" | "https" => Box::new(RemoteBlobStore::azure(config)?),
        #[cfg(not(feature = "azure"))]
        "http" | "https" => {
            return Err(PortError::configuration(format!(
                "endpoint '{}' needs the `azure` feature; \
                 pass a BlobClient implementation to the port with `with_client`",
                config.endpoint()
            )));
        }
        other => {
            return Err(PortError::configuration(format!(
                "unsupported endpoint scheme '{other}' in '{}'",
                config.endpoint()
            )));
        }
    };
    tracing::debug!(
        client = client.kind(),
        account = config.account_name(),
        endpoint = config.endpoint(),
        container = config.container_name(),
        "blob client connected"
    );
    Ok(client)
}
