mod auth;
mod cli;
mod config;
mod error;
mod output;
mod pipeline;
mod store;
mod upstream;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting dashq - Dashboard Query Exporter");
    cli.execute().await?;

    Ok(())
}
