//! Ed25519 keys and signatures for registry entries.
//!
//! A private key is 64 bytes: the 32-byte seed followed by the 32-byte
//! public key derived from it. Public keys and signatures travel as
//! lowercase hex over the wire and as raw bytes everywhere else.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::{Error, Result};
use crate::hash::Hash;

/// Size of a private key (seed + public key) in bytes.
pub const PRIVATE_KEY_SIZE: usize = 64;

/// Size of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of an Ed25519 signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Algorithm tag sent alongside public keys.
pub const ED25519_ALGORITHM: &str = "ed25519";

/// Extracts the public key from 64 bytes of private key material.
pub fn derive_public_key(private_key: &[u8]) -> Result<PublicKey> {
    let keypair: &[u8; PRIVATE_KEY_SIZE] =
        private_key.try_into().map_err(|_| Error::InvalidKey {
            expected: PRIVATE_KEY_SIZE,
            actual: private_key.len(),
        })?;
    Ok(public_half(keypair))
}

fn public_half(keypair: &[u8; PRIVATE_KEY_SIZE]) -> PublicKey {
    let mut public_key = [0u8; PUBLIC_KEY_SIZE];
    public_key.copy_from_slice(&keypair[PRIVATE_KEY_SIZE - PUBLIC_KEY_SIZE..]);
    PublicKey(public_key)
}

/// An Ed25519 private key used to sign registry entries.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    /// Parses 64 bytes of private key material.
    ///
    /// Fails if the length is wrong or if the embedded public key does not
    /// belong to the seed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let keypair: &[u8; PRIVATE_KEY_SIZE] =
            bytes.try_into().map_err(|_| Error::InvalidKey {
                expected: PRIVATE_KEY_SIZE,
                actual: bytes.len(),
            })?;
        SigningKey::from_keypair_bytes(keypair)
            .map(Self)
            .map_err(|_| Error::MismatchedKeyPair)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim()).map_err(|e| Error::decode("private key", e))?;
        Self::from_bytes(&bytes)
    }

    /// Derives the key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(SigningKey::from_bytes(seed))
    }

    /// Generates a new key pair from OS randomness.
    pub fn generate() -> Result<Self> {
        let mut seed = [0u8; 32];
        getrandom::fill(&mut seed).map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(Self::from_seed(&seed))
    }

    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_SIZE] {
        self.0.to_keypair_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The last 32 bytes of the key material.
    pub fn public_key(&self) -> PublicKey {
        public_half(&self.to_bytes())
    }

    /// Signs a digest. Ed25519 signing is deterministic.
    pub fn sign(&self, digest: &Hash) -> Signature {
        Signature(self.0.sign(digest.as_bytes()).to_bytes())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey")
            .field(&self.public_key().to_hex())
            .finish()
    }
}

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    pub const fn from_array(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; PUBLIC_KEY_SIZE] = bytes.try_into().map_err(|_| {
            Error::decode(
                "public key",
                format!("expected {PUBLIC_KEY_SIZE} bytes, got {}", bytes.len()),
            )
        })?;
        Ok(Self(arr))
    }

    /// Parses a hex public key, with or without the `ed25519:` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s
            .strip_prefix(ED25519_ALGORITHM)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| Error::decode("public key", e))?;
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The `ed25519:<hex>` form used in registry queries.
    pub fn to_specifier(&self) -> String {
        format!("{ED25519_ALGORITHM}:{}", self.to_hex())
    }

    /// Checks `signature` over `digest`.
    ///
    /// A signature that does not match yields `Ok(false)`; only a key that
    /// is not a valid curve point is an error.
    pub fn verify(&self, digest: &Hash, signature: &Signature) -> Result<bool> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|e| Error::decode("public key", e))?;
        let signature = ed25519_dalek::Signature::from_bytes(&signature.0);
        Ok(key.verify(digest.as_bytes(), &signature).is_ok())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_hex()).finish()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_SIZE]);

impl Signature {
    pub const fn from_array(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SIGNATURE_SIZE] = bytes.try_into().map_err(|_| {
            Error::decode(
                "signature",
                format!("expected {SIGNATURE_SIZE} bytes, got {}", bytes.len()),
            )
        })?;
        Ok(Self(arr))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim()).map_err(|e| Error::decode("signature", e))?;
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature").field(&self.to_hex()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> PrivateKey {
        PrivateKey::from_seed(&[7u8; 32])
    }

    #[test]
    fn test_derive_public_key_takes_last_half() {
        let key = test_key();
        let bytes = key.to_bytes();
        let derived = derive_public_key(&bytes).unwrap();
        assert_eq!(derived, key.public_key());
        assert_eq!(derived.as_bytes(), &bytes[32..]);
    }

    #[test]
    fn test_public_key_matches_signing_key() {
        let key = test_key();
        assert_eq!(
            key.public_key().as_bytes(),
            &key.0.verifying_key().to_bytes()
        );
        let digest = Hash::new(b"entry");
        assert!(key.public_key().verify(&digest, &key.sign(&digest)).unwrap());
    }

    #[test]
    fn test_derive_public_key_rejects_wrong_length() {
        let err = derive_public_key(&[0u8; 32]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidKey {
                expected: 64,
                actual: 32
            }
        ));
    }

    #[test]
    fn test_private_key_rejects_mismatched_pair() {
        let mut bytes = test_key().to_bytes();
        bytes[40] ^= 0x01;
        assert!(matches!(
            PrivateKey::from_bytes(&bytes).unwrap_err(),
            Error::MismatchedKeyPair
        ));
    }

    #[test]
    fn test_private_key_hex_roundtrip() {
        let key = test_key();
        let parsed = PrivateKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(parsed.to_bytes(), key.to_bytes());
    }

    #[test]
    fn test_sign_verify() {
        let key = test_key();
        let digest = Hash::new(b"registry entry");
        let signature = key.sign(&digest);
        assert!(key.public_key().verify(&digest, &signature).unwrap());
        // deterministic
        assert_eq!(signature, key.sign(&digest));

        let other = Hash::new(b"another entry");
        assert!(!key.public_key().verify(&other, &signature).unwrap());
    }

    #[test]
    fn test_verify_with_wrong_key_fails() {
        let digest = Hash::new(b"registry entry");
        let signature = test_key().sign(&digest);
        let stranger = PrivateKey::from_seed(&[8u8; 32]).public_key();
        assert!(!stranger.verify(&digest, &signature).unwrap());
    }

    #[test]
    fn test_public_key_specifier() {
        let key = test_key().public_key();
        let specifier = key.to_specifier();
        assert!(specifier.starts_with("ed25519:"));
        assert_eq!(PublicKey::from_hex(&specifier).unwrap(), key);
        assert_eq!(PublicKey::from_hex(&key.to_hex()).unwrap(), key);
    }

    #[test]
    fn test_signature_length_checked() {
        assert!(matches!(
            Signature::from_bytes(&[0u8; 28]).unwrap_err(),
            Error::Decode {
                what: "signature",
                ..
            }
        ));
    }

    #[test]
    fn test_generate_produces_distinct_keys() {
        let a = PrivateKey::generate().unwrap();
        let b = PrivateKey::generate().unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }
}
