//! Surge Server Binary

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use surge_config::{ConfigLoader, SurgeConfig};
use surge_logging::init_logging_from_config;
use surge_server::Server;

#[derive(Parser)]
#[command(author, version, about = "HTTP load test server", long_about = None)]
struct Cli {
    /// Configuration file path (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server bind address, e.g. 0.0.0.0:3001
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Print a sample configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", SurgeConfig::generate_sample());
        return Ok(());
    }

    let mut config = ConfigLoader::new().load(cli.config.as_ref())?;
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind.ip().to_string();
        config.server.port = bind.port();
    }

    init_logging_from_config(&config.logging)?;

    let server = Server::new(config)?;
    server.start().await
}
