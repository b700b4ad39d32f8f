use clap::Parser;
use tracing::{info, Level};

use vidshelf::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    info!("Starting vidshelf v{}", env!("CARGO_PKG_VERSION"));

    cli.run().await?;

    Ok(())
}
