use bytes::Bytes;
use dashmap::DashMap;
use futures::stream::{self, TryStreamExt};
use skynet_core::{BlobsApi, ByteStream, Error, Hash, Result, Skylink};
use tracing::debug;

/// Bitfield written into skylinks minted by this store.
const SKYLINK_BITFIELD: u16 = 0;

/// A blob store that keeps uploads in memory.
///
/// Skylinks are derived from the blake2b hash of the content, so uploading
/// identical bytes twice yields the same skylink and stores them once.
#[derive(Debug, Default)]
pub struct MemoryBlobs {
    blobs: DashMap<Skylink, Bytes>,
}

impl MemoryBlobs {
    /// Creates a new, empty `MemoryBlobs`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bytes` and returns their skylink.
    pub fn insert(&self, bytes: Bytes) -> Skylink {
        let skylink = Skylink::from_root(SKYLINK_BITFIELD, &Hash::new(&bytes));
        self.blobs.entry(skylink.clone()).or_insert(bytes);
        skylink
    }

    pub fn contains(&self, skylink: &Skylink) -> bool {
        self.blobs.contains_key(skylink)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait::async_trait]
impl BlobsApi for MemoryBlobs {
    async fn upload(&self, name: &str, stream: ByteStream) -> Result<Skylink> {
        let chunks: Vec<Bytes> = stream.try_collect().await?;
        let bytes = Bytes::from(chunks.concat());
        let len = bytes.len();
        let skylink = self.insert(bytes);
        debug!(name, len, %skylink, "stored blob");
        Ok(skylink)
    }

    async fn download(&self, skylink: &Skylink) -> Result<ByteStream> {
        let bytes = self
            .blobs
            .get(skylink)
            .map(|b| b.value().clone())
            .ok_or_else(|| Error::NotFound(format!("blob {skylink}")))?;
        Ok(Box::new(stream::once(Box::pin(async move { Ok(bytes) }))))
    }
}
