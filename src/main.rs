// Entrypoint for the CLI application.
// - Sets up logging on stderr (`RUST_LOG`, default `sauce_storage=info`).
// - Loads credentials from the environment or the saved file, asking for
//   them when neither is available, then hands off to the menu.

use anyhow::Context;
use sauce_storage::{ui, StorageClient, StorageConfig, StorageSync};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sauce_storage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match StorageConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("No stored credentials ({}), asking for them", e);
            StorageConfig::new(ui::prompt_credentials()?)
                .with_env_overrides()
                .context("Invalid storage settings in environment")?
        }
    };
    tracing::info!(host = %config.host, user = %config.credentials.username, "Using Sauce storage");

    let client = StorageClient::new(config).context("Failed to build HTTP client")?;
    ui::main_menu(StorageSync::new(client))?;
    Ok(())
}
