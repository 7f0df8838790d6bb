use std::path::PathBuf;

use ::tracing::error;
use clap::Parser;
use service::Service;

mod config;
mod http_objects;
mod routes;
mod service;
mod tracing;
use tracing::setup_tracing;

#[cfg(test)]
mod testing;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "config file", help = "Path to config file")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = setup_tracing() {
        eprintln!("Error setting up tracing: {:?}", err);
        return;
    }

    let config = match cli.config {
        Some(path) => match config::ServerConfig::from_path(&path) {
            Ok(config) => config,
            Err(err) => {
                error!("Error loading config from {}: {:?}", path.display(), err);
                return;
            }
        },
        None => config::ServerConfig::default(),
    };

    let service = Service::new(config).await;
    if let Err(err) = service {
        error!("Error creating service: {:?}", err);
        return;
    }
    if let Err(err) = service.unwrap().start().await {
        error!("Error starting service: {:?}", err);
    }
}
