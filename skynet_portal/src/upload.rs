use std::path::{Component, Path};

use bytes::Bytes;
use futures::StreamExt;
use futures::stream;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use skynet_core::{ByteStream, Error, Result, ResultExt, Skylink};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::PortalClient;
use crate::config::UploadOptions;
use crate::content_type::SNIFF_LEN;

/// Files to upload, keyed by the name they get on the portal.
#[derive(Default)]
pub struct UploadData {
    files: Vec<(String, ByteStream)>,
}

impl std::fmt::Debug for UploadData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.files.iter().map(|(name, _)| name))
            .finish()
    }
}

impl UploadData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, stream: ByteStream) -> &mut Self {
        self.files.push((name.into(), stream));
        self
    }

    pub fn add_bytes(&mut self, name: impl Into<String>, bytes: impl Into<Bytes>) -> &mut Self {
        let bytes = bytes.into();
        self.add(name, Box::new(stream::once(Box::pin(async move { Ok(bytes) }))))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    skylink: String,
}

async fn open_file(path: &Path) -> Result<ByteStream> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(Error::from)
        .context(format!("could not open file {}", path.display()))?;
    Ok(Box::new(ReaderStream::new(file)))
}

/// `path` relative to `base`, with `/` as separator on every platform.
fn relative_name(base: &Path, path: &Path) -> Option<String> {
    let parts: Option<Vec<&str>> = path
        .strip_prefix(base)
        .ok()?
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();
    Some(parts?.join("/"))
}

/// Returns all files below `dir`, sorted by path.
pub fn walk_directory(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

impl PortalClient {
    /// Uploads `data` and returns the skylink of the result.
    ///
    /// A single file is sent in the file field unless a custom dirname is
    /// set; anything else is sent as a directory named by the custom dirname.
    pub async fn upload(&self, data: UploadData, opts: &UploadOptions) -> Result<Skylink> {
        self.upload_inner(data, opts)
            .await
            .context("could not upload data")
    }

    async fn upload_inner(&self, data: UploadData, opts: &UploadOptions) -> Result<Skylink> {
        if data.is_empty() {
            return Err(Error::InvalidInput("nothing to upload".into()));
        }

        let mut query = Vec::new();
        let field_name = match (&opts.custom_dirname, data.len()) {
            (None, 1) => opts.file_field_name.clone(),
            (Some(dirname), _) => {
                query.push(("filename", dirname.clone()));
                opts.directory_file_field_name.clone()
            }
            (None, _) => {
                return Err(Error::InvalidInput(
                    "custom dirname must be set when uploading multiple files".into(),
                ));
            }
        };
        query.extend(opts.encryption.query());

        let mut form = Form::new().percent_encode_noop();
        for (name, stream) in data.files {
            let part = self.file_part(&name, stream).await?;
            form = form.part(field_name.clone(), part);
        }

        let response = self
            .request(Method::POST, &opts.portal, "", &query)
            .multipart(form)
            .execute()
            .await?;
        let body: UploadResponse = response.json("upload response").await?;
        let skylink = Skylink::parse(&body.skylink)?;
        info!(%skylink, "upload complete");
        Ok(skylink)
    }

    /// Builds a multipart file part, peeking at the first chunk of the
    /// stream to decide its content type.
    async fn file_part(&self, name: &str, mut stream: ByteStream) -> Result<Part> {
        let head = stream.next().await.transpose()?.unwrap_or_default();
        let content_type = self
            .content_types
            .resolve(name, &head[..head.len().min(SNIFF_LEN)]);
        debug!(name, %content_type, "adding file to upload");

        let body = stream::once(async move { Ok::<_, std::io::Error>(head) }).chain(stream);
        Part::stream(reqwest::Body::wrap_stream(body))
            .file_name(name.to_owned())
            .mime_str(&content_type)
            .map_err(|e| Error::InvalidInput(format!("invalid content type {content_type}: {e}")))
    }

    /// Uploads the file at `path`.
    pub async fn upload_file(&self, path: impl AsRef<Path>, opts: &UploadOptions) -> Result<Skylink> {
        let path = path.as_ref();
        let name = match &opts.custom_filename {
            Some(name) => name.clone(),
            None => path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| Error::InvalidInput(format!("{} has no file name", path.display())))?
                .to_owned(),
        };

        let mut data = UploadData::new();
        data.add(name, open_file(path).await?);
        self.upload(data, opts).await
    }

    /// Uploads every file below `path` as one directory.
    ///
    /// File names are relative to `path`. The directory is named after the
    /// last component of `path` unless a custom dirname is set.
    pub async fn upload_directory(
        &self,
        path: impl AsRef<Path>,
        opts: &UploadOptions,
    ) -> Result<Skylink> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(Error::from)
            .context("error retrieving path info")?;
        if !meta.is_dir() {
            return Err(Error::InvalidInput(format!(
                "given path {} is not a directory",
                path.display()
            )));
        }

        let mut opts = opts.clone();
        if opts.custom_dirname.is_none() {
            let dirname = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_owned();
            opts.custom_dirname = Some(dirname);
        }

        let mut data = UploadData::new();
        for file in walk_directory(path).context("error walking directory")? {
            let name = relative_name(path, &file).ok_or_else(|| {
                Error::InvalidInput(format!("{} is not a valid file name", file.display()))
            })?;
            data.add(name, open_file(&file).await?);
        }
        self.upload(data, &opts).await
    }
}
