use std::path::Path;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::Method;
use skynet_core::{BlobsApi, ByteStream, Error, Result, ResultExt, Skylink};
use tokio::io::AsyncWriteExt;

use crate::PortalClient;
use crate::config::{DownloadOptions, UploadOptions};
use crate::http::transport_error;
use crate::upload::UploadData;

impl PortalClient {
    /// Streams the blob behind `skylink`.
    pub async fn download(&self, skylink: &Skylink, opts: &DownloadOptions) -> Result<ByteStream> {
        let response = self
            .request(
                Method::GET,
                &opts.portal,
                skylink.as_str(),
                &opts.encryption.query(),
            )
            .execute()
            .await
            .context("could not download data")?;

        let timeout = self.options().merged(&opts.portal).timeout;
        let stream = response
            .into_inner()
            .bytes_stream()
            .map_err(move |e| std::io::Error::other(transport_error(e, timeout)));
        Ok(Box::new(Box::pin(stream)))
    }

    /// Downloads the blob behind `skylink` into a new file at `path`.
    pub async fn download_file(
        &self,
        path: impl AsRef<Path>,
        skylink: &Skylink,
        opts: &DownloadOptions,
    ) -> Result<()> {
        let path = path.as_ref();
        let mut stream = self.download(skylink, opts).await?;
        let mut out = tokio::fs::File::create(path)
            .await
            .map_err(Error::from)
            .context(format!("could not create file at {}", path.display()))?;

        let copied: std::io::Result<()> = async {
            while let Some(chunk) = stream.try_next().await? {
                out.write_all(&chunk).await?;
            }
            out.flush().await
        }
        .await;
        copied
            .map_err(Error::from)
            .context(format!("could not copy data to file at {}", path.display()))
    }
}

#[async_trait]
impl BlobsApi for PortalClient {
    async fn upload(&self, name: &str, stream: ByteStream) -> Result<Skylink> {
        let mut data = UploadData::new();
        data.add(name, stream);
        PortalClient::upload(self, data, &UploadOptions::default()).await
    }

    async fn download(&self, skylink: &Skylink) -> Result<ByteStream> {
        PortalClient::download(self, skylink, &DownloadOptions::default()).await
    }
}
