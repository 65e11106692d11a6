//! The signed mutable registry.
//!
//! [`RegistryApi`] is the transport seam: it moves signed entries to and
//! from wherever the registry lives (a portal over HTTP, an in-memory map in
//! tests) and makes no trust decisions. [`RegistryClient`] sits on top of
//! any transport and is the trust boundary: nothing it returns has skipped
//! signature verification.

pub mod types;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Error, Result, ResultExt};
use crate::keys::{PrivateKey, PublicKey};
use types::{RegistryEntry, SignedEntry};

/// Transport for registry entries.
///
/// # Semantics
///
/// - `get` returns `Ok(None)` when no entry exists for the slot. Returned
///   entries are *unverified*; the `data_key` field is the plaintext key the
///   caller asked for, since remote registries only ever see its hash.
/// - `set` publishes an already signed entry. Remote registries are expected
///   to reject entries whose revision does not exceed the stored one.
#[async_trait]
pub trait RegistryApi: std::fmt::Debug + Send + Sync {
    async fn get(&self, public_key: &PublicKey, data_key: &str) -> Result<Option<SignedEntry>>;

    async fn set(&self, public_key: &PublicKey, entry: SignedEntry) -> Result<()>;
}

#[async_trait]
impl<T: RegistryApi + ?Sized + Send + Sync> RegistryApi for std::sync::Arc<T> {
    async fn get(&self, public_key: &PublicKey, data_key: &str) -> Result<Option<SignedEntry>> {
        (**self).get(public_key, data_key).await
    }

    async fn set(&self, public_key: &PublicKey, entry: SignedEntry) -> Result<()> {
        (**self).set(public_key, entry).await
    }
}

#[async_trait]
impl<T: RegistryApi + ?Sized + Send + Sync> RegistryApi for Box<T> {
    async fn get(&self, public_key: &PublicKey, data_key: &str) -> Result<Option<SignedEntry>> {
        (**self).get(public_key, data_key).await
    }

    async fn set(&self, public_key: &PublicKey, entry: SignedEntry) -> Result<()> {
        (**self).set(public_key, entry).await
    }
}

/// Verifying registry client over any [`RegistryApi`] transport.
///
/// Holds no state besides the transport; concurrent writers to the same
/// slot race, and the remote registry decides which revision wins.
#[derive(Debug, Clone)]
pub struct RegistryClient<R> {
    registry: R,
}

impl<R: RegistryApi> RegistryClient<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Fetches the entry at `(public_key, data_key)` and checks its
    /// signature.
    ///
    /// Returns `Ok(None)` if the slot is empty and
    /// [`Error::SignatureVerification`] if the entry does not carry a valid
    /// signature by `public_key`.
    pub async fn get_entry(
        &self,
        public_key: &PublicKey,
        data_key: &str,
    ) -> Result<Option<SignedEntry>> {
        let Some(signed) = self
            .registry
            .get(public_key, data_key)
            .await
            .context("could not get registry entry")?
        else {
            debug!(%public_key, data_key, "registry entry not found");
            return Ok(None);
        };

        if !signed.verify(public_key)? {
            warn!(
                %public_key,
                data_key,
                revision = signed.entry.revision,
                "rejecting registry entry with invalid signature"
            );
            return Err(Error::SignatureVerification);
        }
        Ok(Some(signed))
    }

    /// Signs `entry` with `private_key` and publishes it.
    ///
    /// There is no retry: a rejected revision means another writer got there
    /// first, and the caller has to decide what to do about that.
    pub async fn set_entry(&self, private_key: &PrivateKey, entry: RegistryEntry) -> Result<()> {
        let public_key = private_key.public_key();
        debug!(
            %public_key,
            data_key = %entry.data_key,
            revision = entry.revision,
            "publishing registry entry"
        );
        let signed = entry.sign(private_key);
        self.registry
            .set(&public_key, signed)
            .await
            .context("could not set registry entry")
    }
}
