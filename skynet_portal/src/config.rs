//! Options for talking to a portal.
//!
//! Every endpoint has its own options struct carrying a [`PortalOptions`]
//! plus whatever the endpoint needs. Options set on a call take precedence
//! over the options the [`PortalClient`](crate::PortalClient) was built
//! with; unset fields fall through.

use std::time::Duration;

pub const DEFAULT_PORTAL_URL: &str = "https://siasky.net";

pub const DOWNLOAD_ENDPOINT: &str = "/";
pub const UPLOAD_ENDPOINT: &str = "/skynet/skyfile";
pub const REGISTRY_ENDPOINT: &str = "/skynet/registry";
pub const ADD_SKYKEY_ENDPOINT: &str = "/skynet/addskykey";
pub const CREATE_SKYKEY_ENDPOINT: &str = "/skynet/createskykey";
pub const GET_SKYKEY_ENDPOINT: &str = "/skynet/skykey";
pub const LIST_SKYKEYS_ENDPOINT: &str = "/skynet/skykeys";

/// Connection options shared by all endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalOptions {
    /// Portal to contact instead of the client's portal.
    pub portal_url: Option<String>,
    /// Path of the endpoint, relative to the portal URL.
    pub endpoint_path: Option<String>,
    /// Sent as the password of HTTP basic auth with an empty user.
    pub api_key: Option<String>,
    pub user_agent: Option<String>,
    /// Deadline for the whole request, including reading the body.
    pub timeout: Option<Duration>,
}

impl PortalOptions {
    pub fn new(endpoint_path: impl Into<String>) -> Self {
        Self {
            endpoint_path: Some(endpoint_path.into()),
            ..Default::default()
        }
    }

    pub fn with_portal_url(mut self, portal_url: impl Into<String>) -> Self {
        self.portal_url = Some(portal_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns `self` with every field that is set in `overrides` replaced.
    pub fn merged(&self, overrides: &PortalOptions) -> PortalOptions {
        fn pick<T: Clone>(base: &Option<T>, over: &Option<T>) -> Option<T> {
            over.clone().or_else(|| base.clone())
        }
        PortalOptions {
            portal_url: pick(&self.portal_url, &overrides.portal_url),
            endpoint_path: pick(&self.endpoint_path, &overrides.endpoint_path),
            api_key: pick(&self.api_key, &overrides.api_key),
            user_agent: pick(&self.user_agent, &overrides.user_agent),
            timeout: pick(&self.timeout, &overrides.timeout),
        }
    }
}

/// Skykey used to encrypt an upload or decrypt a download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptionOptions {
    pub skykey_name: Option<String>,
    pub skykey_id: Option<String>,
}

impl EncryptionOptions {
    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(name) = &self.skykey_name {
            query.push(("skykeyname", name.clone()));
        }
        if let Some(id) = &self.skykey_id {
            query.push(("skykeyid", id.clone()));
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub portal: PortalOptions,
    /// Multipart field name for single-file uploads.
    pub file_field_name: String,
    /// Multipart field name for each file of a directory upload.
    pub directory_file_field_name: String,
    /// Overrides the name of an uploaded file.
    pub custom_filename: Option<String>,
    /// Overrides the name of an uploaded directory. Setting it turns even a
    /// single-file upload into a directory upload.
    pub custom_dirname: Option<String>,
    pub encryption: EncryptionOptions,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            portal: PortalOptions::new(UPLOAD_ENDPOINT),
            file_field_name: "file".to_owned(),
            directory_file_field_name: "files[]".to_owned(),
            custom_filename: None,
            custom_dirname: None,
            encryption: EncryptionOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub portal: PortalOptions,
    pub encryption: EncryptionOptions,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            portal: PortalOptions::new(DOWNLOAD_ENDPOINT),
            encryption: EncryptionOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOptions {
    pub portal: PortalOptions,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            portal: PortalOptions::new(REGISTRY_ENDPOINT),
        }
    }
}

/// Options for the skykey endpoints.
///
/// Each skykey call has its own endpoint; leave `endpoint_path` unset to use
/// it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkykeyOptions {
    pub portal: PortalOptions,
}
