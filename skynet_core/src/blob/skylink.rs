use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{Error, Result};
use crate::hash::Hash;

/// URI scheme prefix of skylinks returned by uploads.
pub const URI_SKYNET_PREFIX: &str = "sia://";

/// Size of a raw skylink in bytes (2-byte bitfield + 32-byte merkle root).
pub const RAW_SKYLINK_SIZE: usize = 34;

/// Length of the base64url-encoded form of a skylink.
pub const BASE64_SKYLINK_SIZE: usize = 46;

/// Identifier of an immutable blob on Skynet.
///
/// Stored in its canonical 46-character base64url form. The `sia://`
/// prefix is accepted on input and stripped.
///
/// ```
/// use skynet_core::Skylink;
///
/// let link = Skylink::parse("sia://AADeqJt8vPZtW9Nm_Hc5C5EKPmZhYUZGeBqvibofIMMHtg").unwrap();
/// assert_eq!(link.as_str(), "AADeqJt8vPZtW9Nm_Hc5C5EKPmZhYUZGeBqvibofIMMHtg");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Skylink(String);

impl Skylink {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.strip_prefix(URI_SKYNET_PREFIX).unwrap_or(s);
        let s = s.split(['/', '?', '#']).next().unwrap_or_default();
        if s.len() != BASE64_SKYLINK_SIZE {
            return Err(Error::InvalidContentReference(format!(
                "skylink must be {BASE64_SKYLINK_SIZE} characters, got {}",
                s.len()
            )));
        }
        let raw = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|e| Error::InvalidContentReference(format!("skylink is not base64: {e}")))?;
        if raw.len() != RAW_SKYLINK_SIZE {
            return Err(Error::InvalidContentReference(format!(
                "skylink must decode to {RAW_SKYLINK_SIZE} bytes, got {}",
                raw.len()
            )));
        }
        Ok(Self(s.to_owned()))
    }

    /// Interprets the `data` of a registry entry as a skylink.
    pub fn from_entry_data(data: &[u8]) -> Result<Self> {
        let s = std::str::from_utf8(data).map_err(|e| {
            Error::InvalidContentReference(format!("entry data is not utf-8: {e}"))
        })?;
        Self::parse(s)
    }

    /// Builds a version 1 skylink for a blob with the given merkle root.
    pub fn from_root(bitfield: u16, root: &Hash) -> Self {
        let mut raw = [0u8; RAW_SKYLINK_SIZE];
        raw[..2].copy_from_slice(&bitfield.to_le_bytes());
        raw[2..].copy_from_slice(root.as_bytes());
        Self(URL_SAFE_NO_PAD.encode(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `sia://` form returned by uploads.
    pub fn to_uri(&self) -> String {
        format!("{URI_SKYNET_PREFIX}{}", self.0)
    }

    pub fn to_bytes(&self) -> [u8; RAW_SKYLINK_SIZE] {
        let mut raw = [0u8; RAW_SKYLINK_SIZE];
        // length and alphabet were checked in `parse`/`from_root`
        if let Ok(decoded) = URL_SAFE_NO_PAD.decode(&self.0) {
            raw.copy_from_slice(&decoded);
        }
        raw
    }
}

impl FromStr for Skylink {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for Skylink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Skylink").field(&self.0).finish()
    }
}

impl fmt::Display for Skylink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
