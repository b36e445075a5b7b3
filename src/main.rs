//! Chat Server - Entry Point

use log::{error, info, warn};
use std::process;

use cchat_server::utils::logging::setup_logging;
use cchat_server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // env_logger picks up the RUST_LOG environment variable
    setup_logging();

    info!("Launching chat server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            process::exit(1);
        }
    };

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;
}
