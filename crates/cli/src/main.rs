//! Marketplace Cart CLI

use std::process;

use clap::Parser;

use crate::commands::Cli;

mod commands;
mod config;
mod logging;

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = logging::init(&cli.logging) {
        eprintln!("failed to initialize logging: {error}");
        process::exit(1);
    }

    if let Err(error) = cli.run().await {
        eprintln!("{error}");
        process::exit(1);
    }
}
