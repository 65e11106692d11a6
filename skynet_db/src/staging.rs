//! Temporary files that hold a document while it is uploaded.

use std::io::Write;
use std::path::{Path, PathBuf};

use skynet_core::{ByteStream, Error, Result, ResultExt};
use tempfile::NamedTempFile;
use tokio_util::io::ReaderStream;

/// Where and under which name documents are staged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingOptions {
    /// Directory for staged files; the system temp dir if unset.
    pub temp_dir: Option<PathBuf>,
}

/// A document written to a temporary file.
///
/// The file is deleted when this is dropped, whether or not the upload
/// succeeded.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

/// Makes a data key usable inside a file name.
fn file_name_prefix(data_key: &str) -> String {
    let sanitized: String = data_key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("temp-{sanitized}")
}

impl StagedFile {
    /// Writes `content` to a new temporary file on the blocking pool.
    pub async fn create(opts: &StagingOptions, data_key: &str, content: Vec<u8>) -> Result<Self> {
        let prefix = file_name_prefix(data_key);
        let temp_dir = opts.temp_dir.clone();

        let file = tokio::task::spawn_blocking(move || -> Result<NamedTempFile> {
            let mut builder = tempfile::Builder::new();
            builder.prefix(&prefix);
            let mut file = match &temp_dir {
                Some(dir) => builder.tempfile_in(dir),
                None => builder.tempfile(),
            }
            .map_err(Error::from)
            .context("could not create temporary file")?;

            file.write_all(&content)
                .and_then(|_| file.flush())
                .map_err(Error::from)
                .context("could not write to temporary file")?;
            Ok(file)
        })
        .await
        .map_err(|e| Error::from(std::io::Error::other(e)))
        .context("staging task failed")??;

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Name of the staged file, used as the upload's file name.
    pub fn file_name(&self) -> String {
        self.path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Opens a stream over the staged content.
    pub async fn open(&self) -> Result<ByteStream> {
        let file = tokio::fs::File::open(self.path())
            .await
            .map_err(Error::from)
            .context("could not open temporary file")?;
        Ok(Box::new(ReaderStream::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[test]
    fn test_file_name_prefix() {
        assert_eq!(file_name_prefix("app/settings.json"), "temp-app_settings_json");
        assert_eq!(file_name_prefix(""), "temp-");
    }

    #[tokio::test]
    async fn test_staged_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let opts = StagingOptions {
            temp_dir: Some(dir.path().to_owned()),
        };
        let staged = StagedFile::create(&opts, "doc", b"{\"a\":1}".to_vec())
            .await
            .unwrap();
        let path = staged.path().to_owned();
        assert!(path.starts_with(dir.path()));
        assert!(staged.file_name().starts_with("temp-doc"));

        let chunks: Vec<bytes::Bytes> = staged.open().await.unwrap().try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"{\"a\":1}");

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_temp_dir() {
        let opts = StagingOptions {
            temp_dir: Some(PathBuf::from("/nonexistent/skynet/staging")),
        };
        let err = StagedFile::create(&opts, "doc", b"x".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err.root(), Error::Io(_)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_concurrent_staging_on_single_thread() {
        let dir = tempfile::tempdir().unwrap();
        let opts = StagingOptions {
            temp_dir: Some(dir.path().to_owned()),
        };
        let big = vec![0xabu8; 4 << 20];

        let (a, b) = tokio::join!(
            StagedFile::create(&opts, "big", big.clone()),
            StagedFile::create(&opts, "small", b"hi".to_vec()),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.path(), b.path());

        let chunks: Vec<bytes::Bytes> = a.open().await.unwrap().try_collect().await.unwrap();
        assert_eq!(chunks.concat(), big);
        let chunks: Vec<bytes::Bytes> = b.open().await.unwrap().try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"hi");

        let paths = [a.path().to_owned(), b.path().to_owned()];
        drop((a, b));
        assert!(paths.iter().all(|p| !p.exists()));
    }
}
