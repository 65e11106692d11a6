use std::{fs, io::Write, path::Path};

use anyhow::{Context, Result};
use clap::Subcommand;
use skynet_core::PrivateKey;
use skynet_portal::DEFAULT_PORTAL_URL;
use toml_edit::{DocumentMut, Item, Table};
use tracing::info;

#[derive(Subcommand)]
pub enum CmdConfig {
    /// Creates the config file if it doesn't exist and generates a key pair
    Init {
        /// Portal to write into the config, if none is set yet
        #[arg(long, value_name = "URL")]
        portal: Option<String>,
    },
}

impl CmdConfig {
    pub fn run(self, config_file: &Path) -> Result<()> {
        let mut doc = if config_file.exists() {
            fs::read_to_string(config_file)?
        } else {
            if let Some(parent) = config_file.parent() {
                fs::create_dir_all(parent)?;
            }
            String::new()
        }
        .parse::<DocumentMut>()
        .context("could not parse config file")?;

        match self {
            Self::Init { portal } => {
                let portal_table = doc
                    .entry("portal")
                    .or_insert(Item::Table(Table::new()))
                    .as_table_mut()
                    .context("[portal] in config file is not a table")?;
                if !portal_table.contains_key("url") {
                    let url = portal.as_deref().unwrap_or(DEFAULT_PORTAL_URL);
                    portal_table.insert("url", url.into());
                }

                let identity = doc
                    .entry("identity")
                    .or_insert(Item::Table(Table::new()))
                    .as_table_mut()
                    .context("[identity] in config file is not a table")?;
                let key_file_name = match identity.get("private_key_file").and_then(|i| i.as_str())
                {
                    Some(name) => name.to_owned(),
                    None => {
                        let name = key_file_name(config_file);
                        identity.insert("private_key_file", name.as_str().into());
                        name
                    }
                };

                let key_file = config_file
                    .parent()
                    .unwrap_or_else(|| Path::new("."))
                    .join(&key_file_name);
                if !key_file.exists() {
                    info!("generating key pair in {key_file:?}");
                    let key = PrivateKey::generate().context("could not generate key pair")?;
                    fs::write(&key_file, format!("{}\n", key.to_hex()))
                        .with_context(|| format!("could not write {}", key_file.display()))?;
                    println!("public key: {}", key.public_key().to_specifier());
                }
            }
        }

        info!("writing to config file {config_file:?}");

        let tmp_path = config_file.with_extension("tmp");
        let mut tmp = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        tmp.write_all(doc.to_string().as_bytes())?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, config_file)?;
        Ok(())
    }
}

fn key_file_name(config_file: &Path) -> String {
    let stem = config_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "skynet".to_owned());
    format!("{stem}.privatekey")
}
