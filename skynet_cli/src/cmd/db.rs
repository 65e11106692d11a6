use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use skynet_db::SkyDb;
use skynet_portal::{PortalClient, PortalRegistry};

use crate::DbCmd;
use crate::config::CliConfig;
use crate::helpers::{parse_public_key, read_input};

pub async fn run_db(
    cmd: DbCmd,
    client: &PortalClient,
    config: &CliConfig,
    config_file: &Path,
) -> Result<()> {
    let db = SkyDb::new(PortalRegistry::new(client.clone()), client.clone());
    match cmd {
        DbCmd::Get {
            data_key,
            public_key,
            out,
        } => {
            let public_key = match public_key {
                Some(pk) => parse_public_key(&pk)?,
                None => config.load_private_key(config_file)?.public_key(),
            };
            let Some(doc) = db
                .get_document_bytes(&public_key, &data_key)
                .await
                .context("failed to get document")?
            else {
                bail!("no document for data key '{data_key}' under {public_key}");
            };
            match out {
                Some(out) => tokio::fs::write(&out, &doc)
                    .await
                    .with_context(|| format!("failed to write to {}", out.display()))?,
                None => std::io::stdout()
                    .write_all(&doc)
                    .context("failed to write to stdout")?,
            }
        }
        DbCmd::Set {
            data_key,
            path,
            revision,
        } => {
            let private_key = config.load_private_key(config_file)?;
            let content = read_input(&path).await?;
            let entry = db
                .set_document(&private_key, &data_key, content, revision)
                .await
                .context("failed to set document")?;
            println!(
                "published revision {} -> {}",
                entry.revision,
                String::from_utf8_lossy(&entry.data)
            );
        }
    }
    Ok(())
}
