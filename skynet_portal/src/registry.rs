//! Registry transport over a portal's `/skynet/registry` endpoint.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use serde::{Deserialize, Serialize, Serializer};
use skynet_core::keys::ED25519_ALGORITHM;
use skynet_core::{
    Error, PublicKey, RegistryApi, RegistryClient, RegistryEntry, Result, Signature, SignedEntry,
    hash_data_key,
};
use tracing::warn;

use crate::PortalClient;
use crate::config::RegistryOptions;

/// Body of a successful registry lookup.
#[derive(Debug, Deserialize)]
struct GetEntryResponse {
    /// Hex-encoded entry data.
    data: String,
    revision: u64,
    /// Hex-encoded signature.
    signature: String,
}

#[derive(Debug, Serialize)]
struct SetEntryPublicKey<'a> {
    algorithm: &'static str,
    #[serde(serialize_with = "base64_standard")]
    key: &'a [u8],
}

#[derive(Debug, Serialize)]
struct SetEntryRequest<'a> {
    publickey: SetEntryPublicKey<'a>,
    /// Hex-encoded hash of the data key.
    datakey: String,
    revision: u64,
    #[serde(serialize_with = "base64_standard")]
    data: &'a [u8],
    /// Raw signature bytes, serialized as an array of numbers.
    signature: &'a [u8],
}

fn base64_standard<S: Serializer>(bytes: &&[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&STANDARD.encode(bytes))
}

/// [`RegistryApi`] backed by a portal.
///
/// Entries returned by this transport are not verified; wrap it in a
/// [`RegistryClient`] (see [`PortalClient::registry`]).
#[derive(Debug, Clone)]
pub struct PortalRegistry {
    client: PortalClient,
    options: RegistryOptions,
}

impl PortalRegistry {
    pub fn new(client: PortalClient) -> Self {
        Self::with_options(client, RegistryOptions::default())
    }

    pub fn with_options(client: PortalClient, options: RegistryOptions) -> Self {
        Self { client, options }
    }
}

impl PortalClient {
    /// Verifying registry client for this portal.
    pub fn registry(&self) -> RegistryClient<PortalRegistry> {
        RegistryClient::new(PortalRegistry::new(self.clone()))
    }
}

pub(crate) fn decode_entry(
    data_key: &str,
    body_data: &str,
    revision: u64,
    body_signature: &str,
) -> Result<SignedEntry> {
    let data = hex::decode(body_data).map_err(|e| Error::decode("registry entry data", e))?;
    let signature = Signature::from_hex(body_signature)?;
    Ok(SignedEntry {
        entry: RegistryEntry::new(data_key, data, revision),
        signature,
    })
}

#[async_trait]
impl RegistryApi for PortalRegistry {
    async fn get(&self, public_key: &PublicKey, data_key: &str) -> Result<Option<SignedEntry>> {
        let query = [
            ("publickey", public_key.to_specifier()),
            ("datakey", hash_data_key(data_key).to_hex()),
        ];
        let response = self
            .client
            .request(Method::GET, &self.options.portal, "", &query)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let (status, message) = response.error_message().await;
            return Err(Error::RegistryFetch { status, message });
        }

        let body: GetEntryResponse = response.json("registry entry").await?;
        decode_entry(data_key, &body.data, body.revision, &body.signature).map(Some)
    }

    async fn set(&self, public_key: &PublicKey, signed: SignedEntry) -> Result<()> {
        let body = SetEntryRequest {
            publickey: SetEntryPublicKey {
                algorithm: ED25519_ALGORITHM,
                key: public_key.as_bytes(),
            },
            datakey: signed.entry.hashed_data_key().to_hex(),
            revision: signed.entry.revision,
            data: &signed.entry.data,
            signature: signed.signature.as_bytes(),
        };
        let response = self
            .client
            .request(Method::POST, &self.options.portal, "", &[])
            .json(&body)
            .send()
            .await?;

        match response.status().as_u16() {
            200 | 204 => Ok(()),
            _ => {
                let (status, message) = response.error_message().await;
                warn!(%public_key, status, %message, "portal rejected registry entry");
                Err(Error::RegistryPublish { status, message })
            }
        }
    }
}
