//! The blob client contract the ports are written against.

use crate::error::PortResult;

/// A container-scoped blob storage client.
///
/// Implementations are blocking. A port owns exactly one client and calls
/// [`BlobClient::close`] at most once, then drops it.
pub trait BlobClient: Send {
    /// Download the whole blob into memory.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the container or blob doesn't exist, or a transport error if the
    /// download fails.
    fn download(&self, container: &str, blob: &str) -> PortResult<Vec<u8>>;

    /// Upload `data` as the full content of the blob.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the blob exists and `overwrite` is false, or a transport error
    /// if the upload fails.
    fn upload(&self, container: &str, blob: &str, data: &[u8], overwrite: bool)
    -> PortResult<()>;

    /// Check whether a blob exists.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the check itself fails.
    fn exists(&self, container: &str, blob: &str) -> PortResult<bool>;

    /// Release connections held by the client.
    ///
    /// # Errors
    ///
    /// Returns a transport error if shutting the client down fails.
    fn close(&mut self) -> PortResult<()> {
        Ok(())
    }

    /// Short label used in log events (e.g. `"memory"`, `"local"`).
    fn kind(&self) -> &'static str;
}
