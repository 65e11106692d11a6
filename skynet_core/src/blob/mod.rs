//! Immutable, content-addressed blob storage.

pub mod skylink;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};

use crate::error::Result;
use skylink::Skylink;

/// A stream of blob bytes.
pub type ByteStream = Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send + Unpin + 'static>;

/// Interface for the blob store collaborator.
///
/// Uploads are content-addressed: uploading the same bytes twice yields the
/// same skylink, and nothing is ever overwritten.
#[async_trait]
pub trait BlobsApi: std::fmt::Debug + Send + Sync {
    /// Uploads `stream` under the file name `name` and returns its skylink.
    async fn upload(&self, name: &str, stream: ByteStream) -> Result<Skylink>;

    /// Opens a stream over the blob referenced by `skylink`.
    async fn download(&self, skylink: &Skylink) -> Result<ByteStream>;

    /// Downloads the whole blob into memory.
    async fn download_bytes(&self, skylink: &Skylink) -> Result<Bytes> {
        let chunks: Vec<Bytes> = self.download(skylink).await?.try_collect().await?;
        Ok(Bytes::from(chunks.concat()))
    }
}

#[async_trait]
impl<T: BlobsApi + ?Sized + Send + Sync> BlobsApi for std::sync::Arc<T> {
    async fn upload(&self, name: &str, stream: ByteStream) -> Result<Skylink> {
        (**self).upload(name, stream).await
    }

    async fn download(&self, skylink: &Skylink) -> Result<ByteStream> {
        (**self).download(skylink).await
    }
}
