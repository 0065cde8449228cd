//! # Catalog Service
//!
//! Product catalog microservice answering named commands over TCP.
//!
//! - **Store** ([`actor_framework::ResourceActor`]) - in-memory product table behind an actor
//! - **Catalog** ([`product_actor::CatalogService`]) - create, list, lookup, update, soft delete
//!   and batch validation of products
//! - **Transport** ([`transport::CommandServer`]) - `<length>#<json>` frames routed by command name
//! - **System** ([`app_system::CatalogSystem`]) - startup, wiring and graceful shutdown
//!
//! ```bash
//! RUST_LOG=debug CATALOG_PORT=3001 cargo run
//! ```

mod actor_framework;
mod app_system;
mod clients;
mod domain;
mod messages;
mod product_actor;
mod transport;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod mock_framework;

use tracing::{error, info};

use crate::app_system::{setup_tracing, CatalogConfig, CatalogException, CatalogSystem};
use crate::domain::Pagination;
use crate::transport::CommandServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CatalogConfig::from_env()?;

    // Setup tracing once for the entire application
    setup_tracing(&config.log_level);

    info!(addr = %config.socket_addr(), "Starting catalog service");

    let system = CatalogSystem::new(&config);

    // Direct call through the client: confirms the actors answer before we listen
    let catalog = system
        .catalog_client
        .get_all_products(Pagination::default())
        .await
        .map_err(CatalogException::from)?;
    info!(total_products = catalog.total_products, "Catalog ready");

    let server = CommandServer::bind(config.socket_addr(), system.router()).await?;
    info!(addr = %server.local_addr()?, "Listening for commands");

    server.run(shutdown_signal()).await;

    system.shutdown().await;

    info!("Catalog service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C, stopping");
    }
}
