mod devices;
mod import;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use invdb_client::DevicesClient;
use invdb_core::{AppConfig, LogFormat};
use invdb_import::TracingNotifier;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "invdb-cli")]
#[command(about = "Device inventory command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Bulk import devices from a JSON file
    Import {
        /// Path to a `.json` file holding an array of device records
        path: PathBuf,
        /// Maximum number of writes in flight at once (overrides `INVDB_IMPORT_BATCH_SIZE`)
        #[arg(long)]
        batch_size: Option<usize>,
        /// Report progress as log events instead of terminal messages
        #[arg(long)]
        log_only: bool,
    },
    /// List every stored device
    List,
    /// Delete one device by its type and id
    Delete {
        /// Primary key, usually the device type (e.g. freezer)
        #[arg(long = "type")]
        device_type: String,
        /// Secondary key, usually the device id
        #[arg(long)]
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = invdb_core::load_app_config()?;
    init_tracing(&config)?;

    tracing::debug!(env = %config.env, endpoint = %config.api_endpoint, "configuration loaded");

    let client = DevicesClient::new(&config)?;

    match cli.command {
        Commands::Import {
            path,
            batch_size,
            log_only,
        } => {
            let batch_size = batch_size.unwrap_or(config.import_batch_size);
            if log_only {
                import::run_import(client, &path, batch_size, TracingNotifier).await
            } else {
                import::run_import(client, &path, batch_size, import::ConsoleNotifier).await
            }
        }
        Commands::List => devices::run_list(&client).await,
        Commands::Delete { device_type, id } => {
            devices::run_delete(&client, &device_type, &id).await
        }
    }
}

/// `RUST_LOG` wins over `INVDB_LOG_LEVEL`. Logs go to stderr so `list`
/// output stays pipeable.
fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.env.log_format() {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
    Ok(())
}
