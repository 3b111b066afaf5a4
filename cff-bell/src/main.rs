// cff-bell/src/main.rs
use cff_bell::{application, cli::Cli};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    application::run(Cli::parse()).await
}
