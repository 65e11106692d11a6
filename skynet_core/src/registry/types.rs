//! Registry entries and their signed form.
//!
//! A registry entry is one mutable slot identified by `(public key, data
//! key)`. Entries are never updated in place: every write publishes a new
//! entry with a higher revision, signed over the digest
//!
//! ```text
//! blake2b( blake2b(len(data_key) ++ data_key) ++ len(data) ++ data ++ revision )
//! ```
//!
//! where lengths and the revision are 8-byte little-endian numbers.

use bytes::Bytes;

use crate::encoding::{encode_number, encode_string};
use crate::error::{Error, Result};
use crate::hash::{Hash, hash_data_key};
use crate::keys::{PrivateKey, PublicKey, Signature};

/// The content of a registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Application-chosen name of the slot. Only its hash leaves the client.
    pub data_key: String,
    /// Opaque payload; SkyDB stores a skylink here.
    pub data: Bytes,
    /// Revision number; must grow with every accepted write.
    pub revision: u64,
}

/// A registry entry together with the signature over its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEntry {
    pub entry: RegistryEntry,
    pub signature: Signature,
}

/// Returns the revision that follows `current`.
///
/// Revisions never wrap: an entry at `u64::MAX` cannot be updated.
pub fn next_revision(current: u64) -> Result<u64> {
    current.checked_add(1).ok_or(Error::RevisionOverflow)
}

impl RegistryEntry {
    pub fn new(data_key: impl Into<String>, data: impl Into<Bytes>, revision: u64) -> Self {
        Self {
            data_key: data_key.into(),
            data: data.into(),
            revision,
        }
    }

    /// The digest that is signed for this entry.
    pub fn hash(&self) -> Hash {
        let data_key = hash_data_key(&self.data_key);
        let data = encode_string(&self.data);
        let revision = encode_number(self.revision);
        Hash::from_parts([data_key.as_bytes().as_slice(), &data[..], &revision[..]])
    }

    /// The hash of the data key, as sent to the portal.
    pub fn hashed_data_key(&self) -> Hash {
        hash_data_key(&self.data_key)
    }

    pub fn sign(self, private_key: &PrivateKey) -> SignedEntry {
        let signature = private_key.sign(&self.hash());
        SignedEntry {
            entry: self,
            signature,
        }
    }
}

impl SignedEntry {
    pub fn verify(&self, public_key: &PublicKey) -> Result<bool> {
        public_key.verify(&self.entry.hash(), &self.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> PrivateKey {
        PrivateKey::from_seed(&[42u8; 32])
    }

    fn test_entry() -> RegistryEntry {
        RegistryEntry::new(
            "TEST_KEY",
            Bytes::from_static(b"AADeqJt8vPZtW9Nm_Hc5C5EKPmZhYUZGeBqvibofIMMHtg"),
            2,
        )
    }

    #[test]
    fn test_digest_is_stable() {
        let entry = test_entry();
        assert_eq!(entry.hash(), entry.hash());
        assert_eq!(entry.hash(), entry.clone().hash());
    }

    #[test]
    fn test_digest_layout() {
        let entry = test_entry();
        let mut manual = hash_data_key("TEST_KEY").as_bytes().to_vec();
        manual.extend_from_slice(&(entry.data.len() as u64).to_le_bytes());
        manual.extend_from_slice(&entry.data);
        manual.extend_from_slice(&2u64.to_le_bytes());
        assert_eq!(entry.hash(), Hash::new(&manual));
    }

    #[test]
    fn test_known_entry_signature_verifies() {
        let public_key =
            PublicKey::from_hex("4a964fa1cb329d066aedcf7fc03a249eeea3cf2461811090b287daaaec37ab36")
                .unwrap();
        let signature = Signature::from_hex(
            "f3dc30c2255254a7ffd64e767e15f8b9dc908491907c79afb3a1b24ee3b9602f\
             10ff01bce22e1e700f502190fff4ee209f5b32e4c2b9e1ef6b0bed0c2b558406",
        )
        .unwrap();
        let signed = SignedEntry {
            entry: test_entry(),
            signature,
        };
        assert!(signed.verify(&public_key).unwrap());
    }

    #[test]
    fn test_sign_and_verify() {
        let key = test_key();
        let signed = test_entry().sign(&key);
        assert!(signed.verify(&key.public_key()).unwrap());
    }

    #[test]
    fn test_tampering_breaks_signature() {
        let key = test_key();
        let signed = test_entry().sign(&key);
        let public_key = key.public_key();

        let mut data = signed.clone();
        let mut bytes = data.entry.data.to_vec();
        bytes[0] ^= 0x01;
        data.entry.data = Bytes::from(bytes);
        assert!(!data.verify(&public_key).unwrap());

        let mut data_key = signed.clone();
        data_key.entry.data_key = "TEST_KEZ".to_owned();
        assert!(!data_key.verify(&public_key).unwrap());

        for bit in [0, 1, 8, 63] {
            let mut revision = signed.clone();
            revision.entry.revision ^= 1 << bit;
            assert!(!revision.verify(&public_key).unwrap(), "revision bit {bit}");
        }
    }

    #[test]
    fn test_next_revision() {
        assert_eq!(next_revision(2).unwrap(), 3);
        assert!(matches!(
            next_revision(u64::MAX).unwrap_err(),
            Error::RevisionOverflow
        ));
    }
}
