use std::{env, sync::Arc};

use anyhow::{anyhow, Result};
use bytes::{Bytes, BytesMut};
use futures::{stream::BoxStream, StreamExt};
use object_store::{parse_url, path::Path, ObjectMeta, ObjectStore, WriteMultipart};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::info;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobStorageConfig {
    pub path: Option<String>,
}

impl BlobStorageConfig {
    pub fn new(path: &str) -> Self {
        BlobStorageConfig {
            path: Some(format!("file://{}", path)),
        }
    }
}

impl Default for BlobStorageConfig {
    fn default() -> Self {
        let blob_store_path = format!(
            "file://{}",
            env::current_dir()
                .unwrap()
                .join("fileshare_storage/blobs")
                .to_str()
                .unwrap()
        );
        info!("using blob store path: {}", blob_store_path);
        BlobStorageConfig {
            path: Some(blob_store_path),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PutResult {
    pub url: String,
    pub size_bytes: u64,
    pub sha256_hash: String,
}

/// Byte storage for uploaded files, keyed by their generated filename under a
/// single flat directory.
#[derive(Clone)]
pub struct BlobStorage {
    object_store: Arc<dyn ObjectStore>,
    path: Path,
}

impl BlobStorage {
    pub fn new(config: BlobStorageConfig) -> Result<Self> {
        let url_str = config
            .path
            .ok_or_else(|| anyhow!("blob storage path is not configured"))?;
        let url = url_str.parse::<Url>()?;
        if url.scheme() == "file" {
            // the uploads directory has to exist before the local store can
            // resolve paths under it
            std::fs::create_dir_all(url.path())?;
        }
        let (object_store, path) = parse_url(&url)?;
        Ok(Self {
            object_store: Arc::new(object_store),
            path,
        })
    }

    pub async fn put(
        &self,
        key: &str,
        data: impl futures::Stream<Item = Result<Bytes>> + Send + Unpin,
    ) -> Result<PutResult> {
        let mut hasher = Sha256::new();
        let mut hashed_stream = data.map(|item| {
            item.map(|bytes| {
                hasher.update(&bytes);
                bytes
            })
        });

        let path = self.path.child(key);
        let m = self.object_store.put_multipart(&path).await?;
        let mut w = WriteMultipart::new(m);
        let mut size_bytes = 0;
        while let Some(chunk) = hashed_stream.next().await {
            w.wait_for_capacity(1).await?;
            let chunk = chunk?;
            size_bytes += chunk.len() as u64;
            w.write(&chunk);
        }
        w.finish().await?;

        let hash = format!("{:x}", hasher.finalize());
        Ok(PutResult {
            url: path.to_string(),
            size_bytes,
            sha256_hash: hash,
        })
    }

    /// Metadata for a stored blob, or `None` when no blob exists under `key`.
    pub async fn head(&self, key: &str) -> Result<Option<ObjectMeta>> {
        match self.object_store.head(&self.path.child(key)).await {
            Ok(meta) => Ok(Some(meta)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, path: &str) -> Result<BoxStream<'static, Result<Bytes>>> {
        let client_clone = self.object_store.clone();
        let (tx, rx) = mpsc::unbounded_channel();
        let get_result = client_clone
            .get(&path.into())
            .await
            .map_err(|e| anyhow!("can't get object {:?}: {:?}", path, e))?;
        let path = path.to_string();
        tokio::spawn(async move {
            let mut stream = get_result.into_stream();
            while let Some(chunk) = stream.next().await {
                let _ = tx.send(
                    chunk.map_err(|e| anyhow!("error reading object {:?}: {:?}", path.clone(), e)),
                );
            }
        });
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    pub async fn read_bytes(&self, path: &str) -> Result<Bytes> {
        let mut reader = self.get(path).await?;
        let mut bytes = BytesMut::new();
        while let Some(chunk) = reader.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        Ok(bytes.into())
    }
}

/// Rejects client-supplied blob names that could resolve outside the blob
/// directory. Names generated at upload time never contain separators or dot
/// segments, so anything that does is not ours.
pub fn validate_blob_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(anyhow!("blob name cannot be empty"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(anyhow!("blob name cannot contain path separators"));
    }
    if name.contains("..") {
        return Err(anyhow!("blob name cannot contain dot segments"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;

    fn test_storage() -> (tempfile::TempDir, BlobStorage) {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = BlobStorageConfig::new(temp_dir.path().join("blobs").to_str().unwrap());
        let storage = BlobStorage::new(config).unwrap();
        (temp_dir, storage)
    }

    #[tokio::test]
    async fn put_then_read_back_round_trips() {
        let (_temp_dir, storage) = test_storage();
        let payload = Bytes::from_static(b"hello blob store");
        let put_result = storage
            .put(
                "1700000000123.txt",
                stream::iter(vec![Ok::<_, anyhow::Error>(payload.clone())]),
            )
            .await
            .unwrap();
        assert_eq!(put_result.size_bytes, payload.len() as u64);
        assert!(!put_result.sha256_hash.is_empty());

        let read_back = storage.read_bytes(&put_result.url).await.unwrap();
        assert_eq!(read_back, payload);
    }

    #[tokio::test]
    async fn head_reports_existence() {
        let (_temp_dir, storage) = test_storage();
        assert!(storage.head("1700000000123.png").await.unwrap().is_none());

        storage
            .put(
                "1700000000123.png",
                stream::iter(vec![Ok::<_, anyhow::Error>(Bytes::from_static(b"png"))]),
            )
            .await
            .unwrap();
        let meta = storage.head("1700000000123.png").await.unwrap().unwrap();
        assert_eq!(meta.size, 3);
    }

    #[test]
    fn blob_name_validation() {
        assert!(validate_blob_name("1700000000123.png").is_ok());
        assert!(validate_blob_name("1700000000123").is_ok());
        assert!(validate_blob_name("").is_err());
        assert!(validate_blob_name("../etc/passwd").is_err());
        assert!(validate_blob_name("a/b.png").is_err());
        assert!(validate_blob_name("a\\b.png").is_err());
        assert!(validate_blob_name("..").is_err());
    }
}
