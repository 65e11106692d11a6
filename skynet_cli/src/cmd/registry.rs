use std::path::Path;

use anyhow::{Context, Result, bail};
use skynet_core::{RegistryEntry, next_revision};
use skynet_portal::PortalClient;
use tracing::info;

use crate::RegistryCmd;
use crate::config::CliConfig;
use crate::helpers::{parse_public_key, print_entry};

pub async fn run_registry(
    cmd: RegistryCmd,
    client: &PortalClient,
    config: &CliConfig,
    config_file: &Path,
) -> Result<()> {
    let registry = client.registry();
    match cmd {
        RegistryCmd::Get {
            public_key,
            data_key,
        } => {
            let public_key = parse_public_key(&public_key)?;
            match registry
                .get_entry(&public_key, &data_key)
                .await
                .context("failed to get registry entry")?
            {
                Some(signed) => print_entry(&signed),
                None => bail!("no entry for data key '{data_key}' under {public_key}"),
            }
        }
        RegistryCmd::Set {
            data_key,
            data,
            hex,
            revision,
        } => {
            let private_key = config.load_private_key(config_file)?;
            let data = if hex {
                hex::decode(data.trim()).context("entry data is not valid hex")?
            } else {
                data.into_bytes()
            };
            let revision = match revision {
                Some(revision) => revision,
                None => match registry
                    .get_entry(&private_key.public_key(), &data_key)
                    .await
                    .context("failed to get current registry entry")?
                {
                    Some(current) => next_revision(current.entry.revision)?,
                    None => 0,
                },
            };

            registry
                .set_entry(&private_key, RegistryEntry::new(data_key.as_str(), data, revision))
                .await
                .context("failed to set registry entry")?;
            info!(data_key, revision, "registry entry published");
            println!("published revision {revision}");
        }
    }
    Ok(())
}
