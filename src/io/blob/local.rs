//! Directory-backed blob store for `file://` endpoints.
//!
//! Each container is a subdirectory of the root and each blob path is a file
//! relative to it, so `file:///srv/blobs` with container `input` and blob
//! `data/in.csv` maps to `/srv/blobs/input/data/in.csv`. Uploads go to a
//! sibling temp file first and are renamed into place, so a failed upload never
//! leaves a truncated blob behind.

use crate::error::{ErrorKind, PortError, PortResult};
use crate::io::blob::traits::BlobClient;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a store rooted at `root`. The directory doesn't need to exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Build a store from a `file://` endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint is not a `file://` URL with a path.
    pub fn from_endpoint(endpoint: &str) -> PortResult<Self> {
        let path = endpoint
            .strip_prefix("file://")
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                PortError::configuration(format!(
                    "endpoint '{endpoint}' is not a file:// URL with a path"
                ))
            })?;
        Ok(Self::new(path))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, container: &str, blob: &str) -> PortResult<PathBuf> {
        let relative = Path::new(blob);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if container.is_empty() || blob.is_empty() || escapes {
            return Err(PortError::new(
                ErrorKind::InvalidInput,
                format!("blob {container}/{blob} does not name a file inside the container"),
            ));
        }
        Ok(self.root.join(container).join(relative))
    }
}

impl BlobClient for LocalBlobStore {
    fn download(&self, container: &str, blob: &str) -> PortResult<Vec<u8>> {
        let path = self.blob_path(container, blob)?;
        fs::read(&path).map_err(|e| {
            PortError::from(e).with_source(format!("read {}", path.display()))
        })
    }

    fn upload(
        &self,
        container: &str,
        blob: &str,
        data: &[u8],
        overwrite: bool,
    ) -> PortResult<()> {
        let path = self.blob_path(container, blob)?;
        if !overwrite && path.exists() {
            return Err(PortError::new(
                ErrorKind::AlreadyExists,
                format!("blob {container}/{blob} already exists"),
            ));
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                PortError::from(e).with_source(format!("mkdir -p {}", parent.display()))
            })?;
        }

        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(format!(".{}.tmp", std::process::id()));
        let tmp = path.with_file_name(tmp_name);

        let written = File::create(&tmp)
            .and_then(|mut f| {
                f.write_all(data)?;
                f.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(PortError::from(e).with_source(format!("write {}", path.display())));
        }
        Ok(())
    }

    fn exists(&self, container: &str, blob: &str) -> PortResult<bool> {
        Ok(self.blob_path(container, blob)?.is_file())
    }

    fn kind(&self) -> &'static str {
        "local"
    }
}
