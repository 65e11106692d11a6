use std::path::Path;

use anyhow::Result;

use crate::config::CliConfig;
use crate::helpers::encryption;

mod db;
mod files;
mod keys;
mod registry;
mod skykeys;

pub async fn run_command(
    config_file: &Path,
    portal_url: Option<&str>,
    cmd: crate::Commands,
) -> Result<()> {
    if let crate::Commands::Config { cmd } = cmd {
        return cmd.run(config_file);
    }

    let config = CliConfig::load(config_file)?;
    let client = config.portal_client(portal_url);

    match cmd {
        crate::Commands::Config { .. } => Ok(()),
        crate::Commands::Keys { cmd } => keys::run_keys(cmd, &config, config_file),
        crate::Commands::Registry { cmd } => {
            registry::run_registry(cmd, &client, &config, config_file).await
        }
        crate::Commands::Db { cmd } => db::run_db(cmd, &client, &config, config_file).await,
        crate::Commands::Upload {
            path,
            filename,
            dirname,
            skykey_name,
            skykey_id,
        } => {
            files::run_upload(
                &client,
                &path,
                filename,
                dirname,
                encryption(skykey_name, skykey_id),
            )
            .await
        }
        crate::Commands::Download {
            skylink,
            out,
            skykey_name,
            skykey_id,
        } => files::run_download(&client, &skylink, &out, encryption(skykey_name, skykey_id)).await,
        crate::Commands::Skykeys { cmd } => skykeys::run_skykeys(cmd, &client).await,
    }
}
