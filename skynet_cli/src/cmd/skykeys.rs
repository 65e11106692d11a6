use anyhow::{Context, Result, anyhow};
use skynet_portal::{PortalClient, Skykey, SkykeyOptions, SkykeyType};

use crate::SkykeysCmd;

fn print_skykey(key: &Skykey) {
    println!("{}\t{}\t{}\t{}", key.name, key.id, key.key_type, key.skykey);
}

pub async fn run_skykeys(cmd: SkykeysCmd, client: &PortalClient) -> Result<()> {
    let opts = SkykeyOptions::default();
    match cmd {
        SkykeysCmd::Add { skykey } => {
            client
                .add_skykey(&skykey, &opts)
                .await
                .context("failed to add skykey")?;
            println!("skykey added");
        }
        SkykeysCmd::Create { name, key_type } => {
            let key_type: SkykeyType = key_type.parse()?;
            let key = client
                .create_skykey(&name, key_type, &opts)
                .await
                .context("failed to create skykey")?;
            print_skykey(&key);
        }
        SkykeysCmd::Get { name, id } => {
            let key = match (name, id) {
                (Some(name), _) => client.get_skykey_by_name(&name, &opts).await,
                (None, Some(id)) => client.get_skykey_by_id(&id, &opts).await,
                (None, None) => return Err(anyhow!("either --name or --id is required")),
            }
            .context("failed to get skykey")?;
            print_skykey(&key);
        }
        SkykeysCmd::List => {
            for key in client
                .list_skykeys(&opts)
                .await
                .context("failed to list skykeys")?
            {
                print_skykey(&key);
            }
        }
    }
    Ok(())
}
