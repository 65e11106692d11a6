//! Core Skynet SDK types and traits.
//!
//! This crate defines the shared types and traits used by all Skynet SDK
//! crates.
//!
//! ## Protocol types (wire-stable)
//!
//! The following modules define byte layouts that must match other Skynet
//! implementations bit for bit, because digests and signatures are compared
//! across processes:
//!
//! - Canonical encoding of numbers and strings (`encoding`)
//! - Blake2b-256 digests and the data-key hash (`hash`)
//! - Registry entries and their signed form (`registry::types`)
//! - Skylinks (`blob::skylink::Skylink`)
//!
//! ## Convenience APIs (non-wire)
//!
//! - Ed25519 key handling (`keys`)
//! - The registry transport abstraction (`RegistryApi`) and the verifying
//!   `RegistryClient` built on top of it
//! - The blob store abstraction (`BlobsApi`)
//! - The error taxonomy (`Error`)

pub mod blob;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod keys;
pub mod registry;

pub use blob::skylink::{Skylink, URI_SKYNET_PREFIX};
pub use blob::{BlobsApi, ByteStream};
pub use error::{Error, Result, ResultExt};
pub use hash::{Hash, hash_data_key};
pub use keys::{PrivateKey, PublicKey, Signature, derive_public_key};
pub use registry::types::{RegistryEntry, SignedEntry, next_revision};
pub use registry::{RegistryApi, RegistryClient};
