use std::path::Path;

use anyhow::{Context, Result};
use skynet_portal::{DownloadOptions, EncryptionOptions, PortalClient, UploadOptions};

use crate::helpers::parse_skylink;

pub async fn run_upload(
    client: &PortalClient,
    path: &Path,
    filename: Option<String>,
    dirname: Option<String>,
    encryption: EncryptionOptions,
) -> Result<()> {
    let opts = UploadOptions {
        custom_filename: filename,
        custom_dirname: dirname,
        encryption,
        ..Default::default()
    };
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("failed to stat {}", path.display()))?;
    let skylink = if metadata.is_dir() {
        client.upload_directory(path, &opts).await
    } else {
        client.upload_file(path, &opts).await
    }
    .with_context(|| format!("failed to upload {}", path.display()))?;
    println!("{}", skylink.to_uri());
    Ok(())
}

pub async fn run_download(
    client: &PortalClient,
    skylink: &str,
    out: &Path,
    encryption: EncryptionOptions,
) -> Result<()> {
    let skylink = parse_skylink(skylink)?;
    let opts = DownloadOptions {
        encryption,
        ..Default::default()
    };
    client
        .download_file(out, &skylink, &opts)
        .await
        .with_context(|| format!("failed to download {skylink}"))?;
    println!("downloaded {} to {}", skylink.to_uri(), out.display());
    Ok(())
}
