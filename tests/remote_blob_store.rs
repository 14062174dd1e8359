#![cfg(feature = "azure")]
//! Tests for the `object_store`-backed blob client.

use object_store::ObjectStore;
use object_store::memory::InMemory;
use seafarer::ErrorKind;
use seafarer::config::BlobStorageConfig;
use seafarer::io::blob::{BlobClient, RemoteBlobStore, connect};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn client_over(backend: &Arc<dyn ObjectStore>) -> anyhow::Result<RemoteBlobStore> {
    let backend = Arc::clone(backend);
    Ok(RemoteBlobStore::new("in-memory", move |_| Ok(Arc::clone(&backend)))?)
}

fn in_memory() -> Arc<dyn ObjectStore> {
    Arc::new(InMemory::new())
}

#[test]
fn test_remote_upload_download() -> anyhow::Result<()> {
    let store = client_over(&in_memory())?;

    assert!(!store.exists("input", "nested/dir/a.csv")?);
    store.upload("input", "nested/dir/a.csv", b"x\n1\n", false)?;
    assert!(store.exists("input", "nested/dir/a.csv")?);
    assert_eq!(store.download("input", "nested/dir/a.csv")?, b"x\n1\n");
    assert_eq!(store.kind(), "in-memory");
    Ok(())
}

#[test]
fn test_remote_overwrite_rules() -> anyhow::Result<()> {
    let store = client_over(&in_memory())?;

    store.upload("c1", "a.bin", b"one", false)?;
    let err = store.upload("c1", "a.bin", b"two", false).unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExists);
    assert_eq!(store.download("c1", "a.bin")?, b"one");

    store.upload("c1", "a.bin", b"three", true)?;
    assert_eq!(store.download("c1", "a.bin")?, b"three");
    Ok(())
}

#[test]
fn test_remote_missing_blob_is_not_found() -> anyhow::Result<()> {
    let store = client_over(&in_memory())?;

    let err = store.download("c1", "nope.csv").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.message.contains("c1/nope.csv"));
    Ok(())
}

#[test]
fn test_remote_rejects_malformed_blob_names() -> anyhow::Result<()> {
    let store = client_over(&in_memory())?;

    for blob in ["", "a//b.csv", "../up.csv"] {
        let err = store.upload("c1", blob, b"x", true).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput, "{blob}");
    }
    Ok(())
}

#[test]
fn test_remote_opens_each_container_once_until_closed() -> anyhow::Result<()> {
    let opened = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&opened);
    let mut store = RemoteBlobStore::new("in-memory", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(InMemory::new()) as Arc<dyn ObjectStore>)
    })?;

    store.upload("c1", "a.csv", b"1", true)?;
    store.upload("c1", "b.csv", b"2", true)?;
    store.upload("c2", "a.csv", b"3", true)?;
    assert_eq!(opened.load(Ordering::SeqCst), 2);
    // Containers are separate backends.
    assert!(!store.exists("c2", "b.csv")?);

    store.close()?;
    assert!(!store.exists("c1", "a.csv")?);
    assert_eq!(opened.load(Ordering::SeqCst), 3);
    Ok(())
}

#[test]
fn test_remote_open_failure_is_returned() -> anyhow::Result<()> {
    let store = RemoteBlobStore::new("in-memory", |container| {
        Err(seafarer::PortError::configuration(format!(
            "no backend for {container}"
        )))
    })?;

    let err = store.download("c1", "a.csv").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
    Ok(())
}

#[test]
fn test_connect_routes_emulator_and_hosted_endpoints() -> anyhow::Result<()> {
    let emulator = BlobStorageConfig::from_connection_string(
        "DefaultEndpointsProtocol=http;AccountName=devstoreaccount1;AccountKey=a2V5;\
         BlobEndpoint=http://127.0.0.1:10000/devstoreaccount1;",
        "input",
    )?;
    assert_eq!(connect(&emulator)?.kind(), "azure");

    let hosted = BlobStorageConfig::from_connection_string(
        "DefaultEndpointsProtocol=https;AccountName=dev;AccountKey=a2V5;EndpointSuffix=core.windows.net",
        "input",
    )?;
    assert_eq!(hosted.endpoint(), "https://dev.blob.core.windows.net");
    assert_eq!(connect(&hosted)?.kind(), "azure");
    Ok(())
}

#[test]
fn test_azure_rejects_key_that_is_not_base64() -> anyhow::Result<()> {
    let cfg = BlobStorageConfig::new("dev", "not base64!", "https://dev.blob.core.windows.net", "input")?;

    let err = RemoteBlobStore::azure(&cfg).err().expect("key must be base64");
    assert_eq!(err.kind, ErrorKind::Configuration);
    Ok(())
}

#[cfg(all(feature = "io-csv", feature = "io-parquet"))]
#[test]
fn test_pipeline_over_remote_store() -> anyhow::Result<()> {
    use seafarer::config::{SinkPortConfig, SourcePortConfig};
    use seafarer::testing::{assert_tables_equal, people_batch, people_csv};
    use seafarer::{BlobCsvReader, BlobParquetWriter, Pipeline, decode_parquet};

    let backend = in_memory();
    let storage = BlobStorageConfig::new("dev", "a2V5", "https://dev.blob.core.windows.net", "data")?;
    client_over(&backend)?.upload("data", "in/people.csv", &people_csv(), false)?;

    let source = BlobCsvReader::with_client(
        SourcePortConfig::new(storage.clone(), "in/people.csv")?,
        client_over(&backend)?,
    );
    let sink = BlobParquetWriter::with_client(
        SinkPortConfig::new(storage, "out/people.parquet")?,
        client_over(&backend)?,
    );
    let report = Pipeline::new(source, sink).run()?;

    assert_eq!(report.items, 1);
    let bytes = client_over(&backend)?.download("data", "out/people.parquet")?;
    assert_tables_equal(&decode_parquet(bytes)?, &people_batch());
    Ok(())
}
