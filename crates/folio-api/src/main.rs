//! `folio-api` binary entrypoint.
//!
//! Loads configuration from environment variables and starts the HTTP
//! server.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::sync::Arc;

use anyhow::Result;

use folio_api::config::Config;
use folio_api::server::Server;
use folio_catalog::MemoryBookStore;
use folio_core::observability::{init_logging, LogFormat};

fn choose_log_format(config: &Config) -> LogFormat {
    if config.debug {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_logging(choose_log_format(&config));

    // The only in-tree backend; durable stores plug in through `BookStore`.
    if !config.debug {
        tracing::warn!("using in-memory record store; catalog contents do not survive restarts");
    }
    let store = Arc::new(MemoryBookStore::new());

    let server = Server::with_store(config, store);
    server.serve().await?;
    Ok(())
}
