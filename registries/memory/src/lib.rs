use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use skynet_core::{Error, Hash, PublicKey, RegistryApi, Result, SignedEntry, hash_data_key};
use tracing::debug;

/// A registry that keeps entries in memory.
///
/// Behaves like a portal's registry: slots are keyed by the public key and
/// the hash of the data key, entries must carry a valid signature, and a
/// write is only accepted if its revision is higher than the stored one.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: DashMap<(PublicKey, Hash), SignedEntry>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `entry` without any checks, replacing whatever was there.
    ///
    /// Useful for simulating a misbehaving registry.
    pub fn insert_unchecked(&self, public_key: PublicKey, entry: SignedEntry) {
        let slot = (public_key, entry.entry.hashed_data_key());
        self.entries.insert(slot, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn rejected(message: impl Into<String>) -> Error {
    Error::RegistryPublish {
        status: 400,
        message: message.into(),
    }
}

#[async_trait]
impl RegistryApi for MemoryRegistry {
    async fn get(&self, public_key: &PublicKey, data_key: &str) -> Result<Option<SignedEntry>> {
        let slot = (*public_key, hash_data_key(data_key));
        Ok(self.entries.get(&slot).map(|e| e.value().clone()))
    }

    async fn set(&self, public_key: &PublicKey, entry: SignedEntry) -> Result<()> {
        if !entry.verify(public_key)? {
            return Err(rejected("invalid signature"));
        }
        let slot = (*public_key, entry.entry.hashed_data_key());
        match self.entries.entry(slot) {
            Entry::Occupied(mut existing) => {
                let current = existing.get().entry.revision;
                if entry.entry.revision <= current {
                    return Err(rejected(format!(
                        "revision {} is not higher than current revision {current}",
                        entry.entry.revision
                    )));
                }
                debug!(%public_key, revision = entry.entry.revision, "updated registry entry");
                existing.insert(entry);
            }
            Entry::Vacant(vacant) => {
                debug!(%public_key, revision = entry.entry.revision, "created registry entry");
                vacant.insert(entry);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use skynet_core::{PrivateKey, RegistryEntry};

    fn key() -> PrivateKey {
        PrivateKey::from_seed(&[3; 32])
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let registry = MemoryRegistry::new();
        let key = key();
        let signed = RegistryEntry::new("app", Bytes::from_static(b"v0"), 0).sign(&key);
        registry.set(&key.public_key(), signed.clone()).await.unwrap();

        let got = registry.get(&key.public_key(), "app").await.unwrap();
        assert_eq!(got, Some(signed));
        assert!(registry.get(&key.public_key(), "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_stale_revision() {
        let registry = MemoryRegistry::new();
        let key = key();
        let pk = key.public_key();
        registry
            .set(&pk, RegistryEntry::new("app", Bytes::from_static(b"v5"), 5).sign(&key))
            .await
            .unwrap();

        for revision in [4, 5] {
            let stale = RegistryEntry::new("app", Bytes::from_static(b"old"), revision).sign(&key);
            let err = registry.set(&pk, stale).await.unwrap_err();
            assert!(matches!(err, Error::RegistryPublish { status: 400, .. }));
        }

        registry
            .set(&pk, RegistryEntry::new("app", Bytes::from_static(b"v6"), 6).sign(&key))
            .await
            .unwrap();
        let got = registry.get(&pk, "app").await.unwrap().unwrap();
        assert_eq!(got.entry.revision, 6);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_foreign_signature() {
        let registry = MemoryRegistry::new();
        let owner = key();
        let intruder = PrivateKey::from_seed(&[4; 32]);
        let signed = RegistryEntry::new("app", Bytes::from_static(b"evil"), 1).sign(&intruder);

        let err = registry.set(&owner.public_key(), signed).await.unwrap_err();
        assert!(matches!(err, Error::RegistryPublish { .. }));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_slots_are_per_key() {
        let registry = MemoryRegistry::new();
        let a = key();
        let b = PrivateKey::from_seed(&[5; 32]);
        registry
            .set(&a.public_key(), RegistryEntry::new("app", Bytes::from_static(b"a"), 1).sign(&a))
            .await
            .unwrap();
        registry
            .set(&b.public_key(), RegistryEntry::new("app", Bytes::from_static(b"b"), 1).sign(&b))
            .await
            .unwrap();

        let got = registry.get(&b.public_key(), "app").await.unwrap().unwrap();
        assert_eq!(&got.entry.data[..], b"b");
    }
}
