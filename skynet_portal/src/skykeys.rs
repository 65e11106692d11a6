//! Skykey management endpoints.
//!
//! Skykeys are encryption keys stored by the portal's skykey manager and
//! referenced by name or id when uploading and downloading.

use std::fmt;
use std::str::FromStr;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use skynet_core::{Error, Result, ResultExt};

use crate::PortalClient;
use crate::config::{
    ADD_SKYKEY_ENDPOINT, CREATE_SKYKEY_ENDPOINT, GET_SKYKEY_ENDPOINT, LIST_SKYKEYS_ENDPOINT,
    PortalOptions, SkykeyOptions,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skykey {
    /// The base64-encoded key.
    pub skykey: String,
    pub name: String,
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkykeyType {
    PublicId,
    PrivateId,
}

impl SkykeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PublicId => "public-id",
            Self::PrivateId => "private-id",
        }
    }
}

impl fmt::Display for SkykeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkykeyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "public-id" => Ok(Self::PublicId),
            "private-id" => Ok(Self::PrivateId),
            other => Err(Error::InvalidInput(format!(
                "unknown skykey type {other:?}, expected public-id or private-id"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListSkykeysResponse {
    #[serde(default)]
    skykeys: Vec<Skykey>,
}

/// Fills in the default endpoint path of a skykey call.
fn endpoint(opts: &SkykeyOptions, default_path: &str) -> PortalOptions {
    let mut portal = opts.portal.clone();
    portal.endpoint_path.get_or_insert_with(|| default_path.to_owned());
    portal
}

impl PortalClient {
    /// Stores a base64-encoded skykey with the portal's skykey manager.
    pub async fn add_skykey(&self, skykey: &str, opts: &SkykeyOptions) -> Result<()> {
        self.request(
            Method::POST,
            &endpoint(opts, ADD_SKYKEY_ENDPOINT),
            "",
            &[("skykey", skykey.to_owned())],
        )
        .execute()
        .await
        .context("could not add skykey")?;
        Ok(())
    }

    /// Creates a new skykey stored under `name`.
    pub async fn create_skykey(
        &self,
        name: &str,
        key_type: SkykeyType,
        opts: &SkykeyOptions,
    ) -> Result<Skykey> {
        let query = [
            ("name", name.to_owned()),
            ("type", key_type.as_str().to_owned()),
        ];
        self.request(Method::POST, &endpoint(opts, CREATE_SKYKEY_ENDPOINT), "", &query)
            .execute()
            .await?
            .json("skykey")
            .await
            .context("could not create skykey")
    }

    pub async fn get_skykey_by_name(&self, name: &str, opts: &SkykeyOptions) -> Result<Skykey> {
        self.get_skykey(("name", name), opts)
            .await
            .context(format!("could not get skykey {name:?}"))
    }

    pub async fn get_skykey_by_id(&self, id: &str, opts: &SkykeyOptions) -> Result<Skykey> {
        self.get_skykey(("id", id), opts)
            .await
            .context(format!("could not get skykey with id {id}"))
    }

    async fn get_skykey(&self, (param, value): (&str, &str), opts: &SkykeyOptions) -> Result<Skykey> {
        self.request(
            Method::GET,
            &endpoint(opts, GET_SKYKEY_ENDPOINT),
            "",
            &[(param, value.to_owned())],
        )
        .execute()
        .await?
        .json("skykey")
        .await
    }

    pub async fn list_skykeys(&self, opts: &SkykeyOptions) -> Result<Vec<Skykey>> {
        let response: ListSkykeysResponse = self
            .request(Method::GET, &endpoint(opts, LIST_SKYKEYS_ENDPOINT), "", &[])
            .execute()
            .await?
            .json("skykey list")
            .await
            .context("could not list skykeys")?;
        Ok(response.skykeys)
    }
}
