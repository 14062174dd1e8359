//! In-memory blob store.
//!
//! Clones share the same containers, so a test can hand one clone to a port and
//! keep another to seed inputs and inspect outputs. Every call is counted, which
//! lets tests prove that a closed port never reached the store.

use crate::error::{ErrorKind, PortError, PortResult};
use crate::io::blob::traits::BlobClient;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

type ContainerStorage = Arc<Mutex<HashMap<String, HashMap<String, Vec<u8>>>>>;

/// Named stores reachable through `memory://<name>` endpoints.
static SHARED_STORES: OnceLock<Mutex<HashMap<String, MemoryBlobStore>>> = OnceLock::new();

#[derive(Debug, Default)]
struct CallCounters {
    downloads: AtomicUsize,
    uploads: AtomicUsize,
    closes: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    storage: ContainerStorage,
    counters: Arc<CallCounters>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide store registered under `name`, created on first use.
    ///
    /// This is what a `memory://<name>` endpoint connects to.
    ///
    /// # Panics
    ///
    /// Panics if the registry mutex is poisoned.
    #[must_use]
    pub fn shared(name: &str) -> Self {
        SHARED_STORES
            .get_or_init(|| Mutex::new(HashMap::new()))
            .lock()
            .expect("registry mutex poisoned")
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    /// Store a blob directly, bypassing the call counters.
    ///
    /// # Panics
    ///
    /// Panics if the storage mutex is poisoned.
    pub fn insert(&self, container: &str, blob: &str, data: impl Into<Vec<u8>>) {
        self.storage
            .lock()
            .expect("storage mutex poisoned")
            .entry(container.to_string())
            .or_default()
            .insert(blob.to_string(), data.into());
    }

    /// Read a blob directly, bypassing the call counters.
    ///
    /// # Panics
    ///
    /// Panics if the storage mutex is poisoned.
    #[must_use]
    pub fn get(&self, container: &str, blob: &str) -> Option<Vec<u8>> {
        self.storage
            .lock()
            .expect("storage mutex poisoned")
            .get(container)
            .and_then(|c| c.get(blob))
            .cloned()
    }

    /// Blob names in a container, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the storage mutex is poisoned.
    #[must_use]
    pub fn blob_names(&self, container: &str) -> Vec<String> {
        let storage = self.storage.lock().expect("storage mutex poisoned");
        let mut names: Vec<String> = storage
            .get(container)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default();
        drop(storage);
        names.sort();
        names
    }

    #[must_use]
    pub fn download_count(&self) -> usize {
        self.counters.downloads.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn upload_count(&self) -> usize {
        self.counters.uploads.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn close_count(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }
}

impl BlobClient for MemoryBlobStore {
    fn download(&self, container: &str, blob: &str) -> PortResult<Vec<u8>> {
        self.counters.downloads.fetch_add(1, Ordering::SeqCst);
        self.get(container, blob).ok_or_else(|| {
            PortError::new(
                ErrorKind::NotFound,
                format!("blob {container}/{blob} not found"),
            )
        })
    }

    fn upload(
        &self,
        container: &str,
        blob: &str,
        data: &[u8],
        overwrite: bool,
    ) -> PortResult<()> {
        self.counters.uploads.fetch_add(1, Ordering::SeqCst);
        let mut storage = self.storage.lock().expect("storage mutex poisoned");
        let blobs = storage.entry(container.to_string()).or_default();
        if !overwrite && blobs.contains_key(blob) {
            return Err(PortError::new(
                ErrorKind::AlreadyExists,
                format!("blob {container}/{blob} already exists"),
            ));
        }
        blobs.insert(blob.to_string(), data.to_vec());
        Ok(())
    }

    fn exists(&self, container: &str, blob: &str) -> PortResult<bool> {
        Ok(self.get(container, blob).is_some())
    }

    fn close(&mut self) -> PortResult<()> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
