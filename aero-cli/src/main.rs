//! Aero-Cast CLI - prepares station exports and renders map and chart snapshots.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "aero-cli",
    version,
    about = "Southeast Asia air-quality data toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: aero_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    aero_cmd::run(cli.command).await
}
