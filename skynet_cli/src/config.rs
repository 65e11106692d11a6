use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use skynet_core::PrivateKey;
use skynet_portal::{DEFAULT_PORTAL_URL, PortalClient, PortalOptions};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CliConfig {
    pub portal: CliConfigPortal,
    pub identity: Option<CliConfigIdentity>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CliConfigPortal {
    pub url: String,
    pub api_key: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Default for CliConfigPortal {
    fn default() -> Self {
        Self {
            url: DEFAULT_PORTAL_URL.to_owned(),
            api_key: None,
            user_agent: None,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfigIdentity {
    /// Hex private key file, relative to the config file's directory.
    pub private_key_file: String,
}

impl CliConfig {
    /// Reads the config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .with_context(|| format!("could not parse config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => {
                Err(e).with_context(|| format!("could not read config file {}", path.display()))
            }
        }
    }

    pub fn portal_options(&self) -> PortalOptions {
        let mut options = PortalOptions::default();
        if let Some(api_key) = &self.portal.api_key {
            options = options.with_api_key(api_key);
        }
        if let Some(user_agent) = &self.portal.user_agent {
            options = options.with_user_agent(user_agent);
        }
        if let Some(secs) = self.portal.timeout_secs {
            options = options.with_timeout(Duration::from_secs(secs));
        }
        options
    }

    /// Client for the configured portal, or for `portal_url` if given.
    pub fn portal_client(&self, portal_url: Option<&str>) -> PortalClient {
        let url = portal_url.unwrap_or(&self.portal.url);
        PortalClient::with_options(url, self.portal_options())
    }

    pub fn private_key_path(&self, config_file: &Path) -> Option<PathBuf> {
        let identity = self.identity.as_ref()?;
        let dir = config_file.parent().unwrap_or_else(|| Path::new("."));
        Some(dir.join(&identity.private_key_file))
    }

    /// Loads the signing key named in `[identity]`.
    pub fn load_private_key(&self, config_file: &Path) -> Result<PrivateKey> {
        let path = self.private_key_path(config_file).ok_or_else(|| {
            anyhow!(
                "no [identity] in {}; run `skynet config init` first",
                config_file.display()
            )
        })?;
        let hex_key = std::fs::read_to_string(&path)
            .with_context(|| format!("could not read private key file {}", path.display()))?;
        PrivateKey::from_hex(&hex_key)
            .with_context(|| format!("invalid private key in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.portal.url, DEFAULT_PORTAL_URL);
        assert!(config.portal_options().timeout.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[portal]
url = "https://portal.example"
api_key = "foobar"
user_agent = "Sia-Agent"
timeout_secs = 30

[identity]
private_key_file = "config.privatekey"
"#,
        )
        .unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.portal.url, "https://portal.example");
        let options = config.portal_options();
        assert_eq!(options.api_key.as_deref(), Some("foobar"));
        assert_eq!(options.user_agent.as_deref(), Some("Sia-Agent"));
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
        assert_eq!(
            config.private_key_path(&path).unwrap(),
            dir.path().join("config.privatekey")
        );

        assert_eq!(config.portal_client(None).portal_url(), "https://portal.example");
        assert_eq!(
            config.portal_client(Some("http://localhost:9980")).portal_url(),
            "http://localhost:9980"
        );
    }

    #[test]
    fn test_load_private_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let key = PrivateKey::from_seed(&[9; 32]);
        std::fs::write(dir.path().join("key.hex"), format!("{}\n", key.to_hex())).unwrap();

        let config = CliConfig {
            identity: Some(CliConfigIdentity {
                private_key_file: "key.hex".into(),
            }),
            ..Default::default()
        };
        let loaded = config.load_private_key(&path).unwrap();
        assert_eq!(loaded.public_key(), key.public_key());

        let err = CliConfig::default().load_private_key(&path).unwrap_err();
        assert!(err.to_string().contains("config init"));
    }

    #[test]
    fn test_rejects_malformed_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[portal]\ntimeout_secs = \"soon\"\n").unwrap();
        assert!(CliConfig::load(&path).is_err());
    }
}
