//! HTTP client for Skynet portals.
//!
//! [`PortalClient`] talks to a portal's HTTP API: uploads and downloads
//! (it implements [`BlobsApi`](skynet_core::BlobsApi)), the registry (through
//! [`PortalRegistry`], a [`RegistryApi`](skynet_core::RegistryApi)) and the
//! skykey manager.
//!
//! ```no_run
//! # async fn run() -> skynet_core::Result<()> {
//! use skynet_portal::{PortalClient, UploadData, UploadOptions};
//!
//! let client = PortalClient::default();
//! let mut data = UploadData::new();
//! data.add_bytes("hello.txt", "hello world");
//! let skylink = client.upload(data, &UploadOptions::default()).await?;
//! println!("{}", skylink.to_uri());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod content_type;
mod download;
mod http;
pub mod registry;
pub mod skykeys;
mod upload;

pub use config::{
    DEFAULT_PORTAL_URL, DownloadOptions, EncryptionOptions, PortalOptions, RegistryOptions,
    SkykeyOptions, UploadOptions,
};
pub use content_type::{ContentTypeResolver, DefaultContentTypeResolver};
pub use http::{PortalClient, make_url};
pub use registry::PortalRegistry;
pub use skykeys::{Skykey, SkykeyType};
pub use upload::{UploadData, walk_directory};
