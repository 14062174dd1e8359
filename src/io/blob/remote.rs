//! Blob client for hosted storage, backed by `object_store`.
//!
//! [`RemoteBlobStore::azure`] serves `https://<account>.blob.core.windows.net`
//! and emulator endpoints such as `http://127.0.0.1:10000/<account>`. Any other
//! [`ObjectStore`] can be plugged in with [`RemoteBlobStore::new`], which is how
//! the tests drive this client against `object_store::memory::InMemory`.
//!
//! Each call runs to completion on a private current-thread tokio runtime, so
//! the client keeps the blocking [`BlobClient`] contract. Don't call it from
//! inside another tokio runtime.

use crate::config::BlobStorageConfig;
use crate::error::{ErrorKind, PortError, PortResult};
use crate::io::blob::traits::BlobClient;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::path::Path;
use object_store::{ObjectStore, PutMode, PutOptions, PutPayload};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::runtime::{Builder, Runtime};

type OpenStore = Box<dyn Fn(&str) -> PortResult<Arc<dyn ObjectStore>> + Send>;

/// A [`BlobClient`] over one `object_store` backend per container.
pub struct RemoteBlobStore {
    kind: &'static str,
    runtime: Runtime,
    open: OpenStore,
    stores: Mutex<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl RemoteBlobStore {
    /// Build a client that asks `open` for the store behind each container.
    ///
    /// `open` is called once per container name; the store is cached until
    /// [`BlobClient::close`].
    ///
    /// # Errors
    ///
    /// Returns an internal error if the runtime cannot be started.
    pub fn new<F>(kind: &'static str, open: F) -> PortResult<Self>
    where
        F: Fn(&str) -> PortResult<Arc<dyn ObjectStore>> + Send + 'static,
    {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                PortError::new(ErrorKind::InternalError, "start blob client runtime")
                    .with_source(e.to_string())
            })?;
        Ok(Self {
            kind,
            runtime,
            open: Box::new(open),
            stores: Mutex::new(HashMap::new()),
        })
    }

    /// Connect to Azure Blob Storage or an emulator using shared-key credentials.
    ///
    /// Plain `http` is only allowed when the endpoint itself is `http://`. No
    /// request is made until the first download, upload or exists call.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the account key is not base64 or the
    /// endpoint is not a valid URL.
    pub fn azure(config: &BlobStorageConfig) -> PortResult<Self> {
        let account = config.account_name().to_string();
        let key = config.account_key().to_string();
        let endpoint = config.endpoint().to_string();
        let allow_http = config.scheme() == "http";

        let client = Self::new("azure", move |container| {
            let store = MicrosoftAzureBuilder::new()
                .with_account(account.as_str())
                .with_access_key(key.as_str())
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http)
                .with_container_name(container)
                .build()
                .map_err(|e| {
                    PortError::configuration(format!(
                        "azure client for {endpoint} container '{container}'"
                    ))
                    .with_source(e.to_string())
                })?;
            Ok(Arc::new(store) as Arc<dyn ObjectStore>)
        })?;
        // Surface credential and endpoint errors at connect time.
        client.store(config.container_name())?;
        Ok(client)
    }

    /// # Panics
    ///
    /// Panics if the store cache mutex is poisoned.
    fn store(&self, container: &str) -> PortResult<Arc<dyn ObjectStore>> {
        let mut stores = self.stores.lock().expect("store cache mutex poisoned");
        if let Some(store) = stores.get(container) {
            return Ok(Arc::clone(store));
        }
        let store = (self.open)(container)?;
        stores.insert(container.to_string(), Arc::clone(&store));
        Ok(store)
    }
}

fn object_path(container: &str, blob: &str) -> PortResult<Path> {
    if blob.is_empty() {
        return Err(PortError::new(
            ErrorKind::InvalidInput,
            format!("blob {container}/ has no name"),
        ));
    }
    Path::parse(blob).map_err(|e| {
        PortError::new(ErrorKind::InvalidInput, format!("blob {container}/{blob}"))
            .with_source(e.to_string())
    })
}

fn store_error(err: object_store::Error, container: &str, blob: &str) -> PortError {
    use object_store::Error;

    let kind = match &err {
        Error::NotFound { .. } => ErrorKind::NotFound,
        Error::AlreadyExists { .. } | Error::Precondition { .. } => ErrorKind::AlreadyExists,
        Error::PermissionDenied { .. } | Error::Unauthenticated { .. } => {
            ErrorKind::Authentication
        }
        Error::InvalidPath { .. } => ErrorKind::InvalidInput,
        Error::UnknownConfigurationKey { .. } => ErrorKind::Configuration,
        _ => ErrorKind::Network,
    };
    PortError::new(kind, format!("blob {container}/{blob}")).with_source(err.to_string())
}

impl BlobClient for RemoteBlobStore {
    fn download(&self, container: &str, blob: &str) -> PortResult<Vec<u8>> {
        let store = self.store(container)?;
        let path = object_path(container, blob)?;
        let bytes = self
            .runtime
            .block_on(async { store.get(&path).await?.bytes().await })
            .map_err(|e| store_error(e, container, blob))?;
        tracing::trace!(container, blob, bytes = bytes.len(), "downloaded blob");
        Ok(bytes.to_vec())
    }

    fn upload(
        &self,
        container: &str,
        blob: &str,
        data: &[u8],
        overwrite: bool,
    ) -> PortResult<()> {
        let store = self.store(container)?;
        let path = object_path(container, blob)?;
        let options = if overwrite {
            PutOptions::default()
        } else {
            PutOptions::from(PutMode::Create)
        };
        self.runtime
            .block_on(store.put_opts(&path, PutPayload::from(data.to_vec()), options))
            .map_err(|e| store_error(e, container, blob))?;
        tracing::trace!(container, blob, bytes = data.len(), "uploaded blob");
        Ok(())
    }

    fn exists(&self, container: &str, blob: &str) -> PortResult<bool> {
        let store = self.store(container)?;
        let path = object_path(container, blob)?;
        match self.runtime.block_on(store.head(&path)) {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(store_error(e, container, blob)),
        }
    }

    fn close(&mut self) -> PortResult<()> {
        self.stores
            .get_mut()
            .expect("store cache mutex poisoned")
            .clear();
        Ok(())
    }

    fn kind(&self) -> &'static str {
        self.kind
    }
}
