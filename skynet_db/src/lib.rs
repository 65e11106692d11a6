//! SkyDB: mutable documents on Skynet.
//!
//! A document lives in the blob store; the registry entry at
//! `(public key, data key)` holds the skylink of its current version. Reads
//! follow the pointer, writes upload a new blob and publish a new entry with
//! the next revision.
//!
//! Writes are optimistic. Nothing is locked between reading the current
//! revision and publishing the next one; if another writer wins the race,
//! the registry rejects the stale revision and the caller may retry. A blob
//! uploaded by a write that then fails to publish is simply never
//! referenced.

mod staging;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use skynet_core::{
    BlobsApi, ByteStream, Error, PrivateKey, PublicKey, RegistryApi, RegistryClient,
    RegistryEntry, Result, ResultExt, Skylink, next_revision,
};
use tracing::{debug, info};

pub use staging::{StagedFile, StagingOptions};

/// Document store over a registry transport and a blob store.
#[derive(Debug, Clone)]
pub struct SkyDb<R, B> {
    registry: RegistryClient<R>,
    blobs: B,
    staging: StagingOptions,
}

impl<R: RegistryApi, B: BlobsApi> SkyDb<R, B> {
    pub fn new(registry: R, blobs: B) -> Self {
        Self {
            registry: RegistryClient::new(registry),
            blobs,
            staging: StagingOptions::default(),
        }
    }

    pub fn with_staging(mut self, staging: StagingOptions) -> Self {
        self.staging = staging;
        self
    }

    pub fn registry(&self) -> &RegistryClient<R> {
        &self.registry
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Resolves the skylink the entry at `(public_key, data_key)` points to.
    ///
    /// Returns `Ok(None)` if there is no entry.
    pub async fn get_skylink(&self, public_key: &PublicKey, data_key: &str) -> Result<Option<Skylink>> {
        let Some(signed) = self
            .registry
            .get_entry(public_key, data_key)
            .await
            .context("could not get entry")?
        else {
            return Ok(None);
        };
        Skylink::from_entry_data(&signed.entry.data).map(Some)
    }

    /// Streams the current version of a document.
    ///
    /// Returns `Ok(None)` if the document was never written.
    pub async fn get_document(
        &self,
        public_key: &PublicKey,
        data_key: &str,
    ) -> Result<Option<ByteStream>> {
        let Some(skylink) = self.get_skylink(public_key, data_key).await? else {
            return Ok(None);
        };
        debug!(%public_key, data_key, %skylink, "downloading document");
        self.blobs
            .download(&skylink)
            .await
            .context("could not download document")
            .map(Some)
    }

    /// Like [`get_document`](Self::get_document), but collects the document
    /// into memory.
    pub async fn get_document_bytes(
        &self,
        public_key: &PublicKey,
        data_key: &str,
    ) -> Result<Option<Bytes>> {
        let Some(skylink) = self.get_skylink(public_key, data_key).await? else {
            return Ok(None);
        };
        self.blobs
            .download_bytes(&skylink)
            .await
            .context("could not download document")
            .map(Some)
    }

    /// Reads a JSON document.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        public_key: &PublicKey,
        data_key: &str,
    ) -> Result<Option<T>> {
        let Some(bytes) = self.get_document_bytes(public_key, data_key).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::decode("json document", e))
    }

    /// Revision the next write to `(public_key, data_key)` should use.
    ///
    /// An empty slot starts at revision 0.
    pub async fn next_revision(&self, public_key: &PublicKey, data_key: &str) -> Result<u64> {
        match self
            .registry
            .get_entry(public_key, data_key)
            .await
            .context("could not get entry")?
        {
            Some(current) => next_revision(current.entry.revision),
            None => Ok(0),
        }
    }

    /// Publishes `content` as the new version of a document.
    ///
    /// Without an explicit `revision` the current entry is fetched and its
    /// revision plus one is used. Returns the entry that was published.
    pub async fn set_document(
        &self,
        private_key: &PrivateKey,
        data_key: &str,
        content: impl AsRef<[u8]>,
        revision: Option<u64>,
    ) -> Result<RegistryEntry> {
        let revision = match revision {
            Some(revision) => revision,
            None => {
                self.next_revision(&private_key.public_key(), data_key)
                    .await?
            }
        };

        let skylink = {
            let staged =
                StagedFile::create(&self.staging, data_key, content.as_ref().to_vec()).await?;
            let stream = staged.open().await?;
            self.blobs
                .upload(&staged.file_name(), stream)
                .await
                .context("could not upload file")?
        };

        let entry = RegistryEntry::new(data_key, skylink.as_str().to_owned(), revision);
        self.registry.set_entry(private_key, entry.clone()).await?;
        info!(
            public_key = %private_key.public_key(),
            data_key,
            revision,
            %skylink,
            "document published"
        );
        Ok(entry)
    }

    /// Serializes `value` as JSON and publishes it.
    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        private_key: &PrivateKey,
        data_key: &str,
        value: &T,
        revision: Option<u64>,
    ) -> Result<RegistryEntry> {
        let json = serde_json::to_vec(value).map_err(|e| Error::InvalidInput(e.to_string()))?;
        self.set_document(private_key, data_key, json, revision).await
    }
}
