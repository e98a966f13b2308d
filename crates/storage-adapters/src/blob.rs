//! Blob storage for drive file content.
//!
//! The memory store backs tests and the default wiring; the local store
//! writes one file per blob under a root directory, named by the drive
//! file id.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use domains::BlobStore;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<Uuid, Bytes>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn save(&self, id: Uuid, data: Bytes) -> anyhow::Result<()> {
        self.blobs.insert(id, data);
        Ok(())
    }

    async fn load(&self, id: Uuid) -> anyhow::Result<Option<Bytes>> {
        Ok(self.blobs.get(&id).map(|b| b.clone()))
    }
}

#[cfg(feature = "media-local")]
pub use local::LocalBlobStore;

#[cfg(feature = "media-local")]
mod local {
    use super::*;
    use std::path::PathBuf;
    use tokio::fs;

    pub struct LocalBlobStore {
        root: PathBuf,
    }

    impl LocalBlobStore {
        pub fn new(root: PathBuf) -> Self {
            Self { root }
        }

        fn path_for(&self, id: Uuid) -> PathBuf {
            self.root.join(id.to_string())
        }
    }

    #[async_trait]
    impl BlobStore for LocalBlobStore {
        async fn save(&self, id: Uuid, data: Bytes) -> anyhow::Result<()> {
            fs::create_dir_all(&self.root).await?;
            fs::write(self.path_for(id), &data).await?;
            Ok(())
        }

        async fn load(&self, id: Uuid) -> anyhow::Result<Option<Bytes>> {
            match fs::read(self.path_for(id)).await {
                Ok(data) => Ok(Some(Bytes::from(data))),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_round_trip() {
        let store = MemoryBlobStore::new();
        let id = Uuid::now_v7();
        store.save(id, Bytes::from_static(b"hello")).await.unwrap();
        assert_eq!(
            store.load(id).await.unwrap().unwrap().as_ref(),
            b"hello"
        );
        assert!(store.load(Uuid::now_v7()).await.unwrap().is_none());
    }
}
