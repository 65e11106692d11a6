use crate::init_config::CmdConfig;
use anyhow::Context;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::InfoLevel;
use directories::ProjectDirs;
use std::path::PathBuf;

mod cmd;
mod config;
mod helpers;
mod init_config;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the one in the platform config dir
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Portal to talk to, overriding the config file
    #[arg(short, long, value_name = "URL", global = true)]
    portal: Option<String>,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity<InfoLevel>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Modify the CLI config
    Config {
        #[command(subcommand)]
        cmd: CmdConfig,
    },
    /// Ed25519 key pairs
    Keys {
        #[command(subcommand)]
        cmd: KeysCmd,
    },
    /// Read and write raw registry entries
    Registry {
        #[command(subcommand)]
        cmd: RegistryCmd,
    },
    /// Read and write SkyDB documents
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },
    /// Upload a file or directory to the portal
    Upload {
        /// File or directory to upload
        path: PathBuf,
        /// File name to send instead of the local one
        #[arg(long)]
        filename: Option<String>,
        /// Directory name to send instead of the local one
        #[arg(long)]
        dirname: Option<String>,
        /// Encrypt with the portal's skykey of this name
        #[arg(long, conflicts_with = "skykey_id")]
        skykey_name: Option<String>,
        /// Encrypt with the portal's skykey of this id
        #[arg(long)]
        skykey_id: Option<String>,
    },
    /// Download a skylink into a local file
    Download {
        /// Skylink, with or without the sia:// prefix
        skylink: String,
        /// Output file path
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long, conflicts_with = "skykey_id")]
        skykey_name: Option<String>,
        #[arg(long)]
        skykey_id: Option<String>,
    },
    /// Manage the portal's skykeys
    Skykeys {
        #[command(subcommand)]
        cmd: SkykeysCmd,
    },
}

#[derive(Subcommand)]
enum KeysCmd {
    /// Print a new random key pair
    Generate,
    /// Print the public key of the configured identity
    Show,
}

#[derive(Subcommand)]
enum RegistryCmd {
    /// Fetch and verify the entry at (public key, data key)
    Get {
        /// Public key in hex, optionally prefixed with "ed25519:"
        public_key: String,
        data_key: String,
    },
    /// Sign and publish an entry with the configured identity
    Set {
        data_key: String,
        /// Entry data; use --hex for binary data
        data: String,
        /// Interpret data as hex
        #[arg(long)]
        hex: bool,
        /// Revision to publish; defaults to the current revision plus one
        #[arg(short, long)]
        revision: Option<u64>,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    /// Print or save the current version of a document
    Get {
        data_key: String,
        /// Owner of the document; defaults to the configured identity
        #[arg(long, value_name = "PUBLIC_KEY")]
        public_key: Option<String>,
        /// Write the document to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Publish a file (or stdin, with "-") as the new version of a document
    Set {
        data_key: String,
        path: PathBuf,
        /// Revision to publish; defaults to the current revision plus one
        #[arg(short, long)]
        revision: Option<u64>,
    },
}

#[derive(Subcommand)]
enum SkykeysCmd {
    /// Add an existing skykey to the portal
    Add { skykey: String },
    /// Create a new skykey
    Create {
        name: String,
        /// "private-id" or "public-id"
        #[arg(long = "type", default_value = "private-id")]
        key_type: String,
    },
    /// Show a skykey by name or id
    Get {
        #[arg(long, conflicts_with = "id", required_unless_present = "id")]
        name: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },
    /// List all skykeys
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    // Config lives under ~/.config/skynet/config.toml unless --config is given.
    let config_file = match cli.config {
        Some(path) => path,
        None => ProjectDirs::from("", "", "skynet")
            .context("failed to determine config directory path")?
            .config_dir()
            .join("config.toml"),
    };

    cmd::run_command(&config_file, cli.portal.as_deref(), cli.cmd).await
}
