use std::path::Path;

use anyhow::{Context, Result};
use skynet_core::PrivateKey;

use crate::KeysCmd;
use crate::config::CliConfig;

pub fn run_keys(cmd: KeysCmd, config: &CliConfig, config_file: &Path) -> Result<()> {
    match cmd {
        KeysCmd::Generate => {
            let key = PrivateKey::generate().context("could not generate key pair")?;
            println!("private key: {}", key.to_hex());
            println!("public key:  {}", key.public_key().to_specifier());
        }
        KeysCmd::Show => {
            let key = config.load_private_key(config_file)?;
            println!("{}", key.public_key().to_specifier());
        }
    }
    Ok(())
}
