mod branch;
mod config;
mod database;
mod error;
mod server;
mod timing;

use std::sync::Arc;

use config::Config;
use database::sqlite::SqliteDatabase;
use error::AppResult;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use server::server::Server;
use timing::clock::SystemClock;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_target(false)
        .init();

    let timezone = config.timezone()?;
    let pool = SqliteDatabase::open_file_pool(&config.database_path)?;
    info!(database = %config.database_path, timezone = %config.timezone, "Database ready");

    let listener = TcpListener::bind(config.bind_address.as_str()).await?;
    info!("Listening on {}", config.bind_address);

    let server = Server::setup(Arc::new(pool), config, Arc::new(SystemClock::new(timezone)));

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(connection) => connection,
            Err(err) => {
                error!("Could not accept connection: {}", err);
                continue;
            }
        };
        let io = TokioIo::new(stream);
        let server_clone = server.clone();
        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .serve_connection(io, server_clone)
                .await
            {
                error!(%peer, "Connection error: {}", err);
            }
        });
    }
}
