use std::path::Path;

use anyhow::{Context, Result};
use skynet_core::{PublicKey, SignedEntry, Skylink};
use skynet_portal::EncryptionOptions;

pub fn parse_public_key(s: &str) -> Result<PublicKey> {
    PublicKey::from_hex(s).with_context(|| format!("invalid public key '{s}'"))
}

pub fn parse_skylink(s: &str) -> Result<Skylink> {
    Skylink::parse(s).with_context(|| format!("invalid skylink '{s}'"))
}

pub fn encryption(skykey_name: Option<String>, skykey_id: Option<String>) -> EncryptionOptions {
    EncryptionOptions {
        skykey_name,
        skykey_id,
    }
}

/// Human-readable form of entry data: the text if it is UTF-8, hex otherwise.
pub fn display_data(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) if !text.chars().any(char::is_control) => text.to_owned(),
        _ => format!("hex:{}", hex::encode(data)),
    }
}

pub fn print_entry(signed: &SignedEntry) {
    println!("data_key:  {}", signed.entry.data_key);
    println!("revision:  {}", signed.entry.revision);
    println!("data:      {}", display_data(&signed.entry.data));
    println!("signature: {}", signed.signature.to_hex());
}

pub async fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        use tokio::io::AsyncReadExt;
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}
