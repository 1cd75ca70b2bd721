//! Geneosctl - manage Geneos component instances across hosts

use clap::Parser;

use geneosctl_cli::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
