//! Kondex CLI entry point

use clap::Parser;
use kondex::cli::Cli;
use kondex::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("KONDEX_LOG"))
        .init();

    let cli = Cli::parse();
    kondex::commands::run(cli)
}
