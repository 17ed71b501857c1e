//! Lending backend entry point: loads settings, prepares the database and
//! serves the REST API.

mod server;

use std::io;

use actix_web::web;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use hippo_backend::inbound::http::auth::ApiKeyDigest;
use hippo_backend::inbound::http::health::HealthState;
use hippo_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use hippo_backend::settings::AppSettings;

use server::{ServerConfig, create_server};

async fn migrate(database_url: &str) -> io::Result<()> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || run_pending_migrations(&url))
        .await
        .map_err(|err| io::Error::other(format!("migration task failed: {err}")))?
        .map_err(io::Error::other)?;
    Ok(())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| io::Error::other(format!("failed to load settings: {err}")))?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let database_url = settings.database_url().map_err(io::Error::other)?;
    let api_key = ApiKeyDigest::new(&settings.api_key().map_err(io::Error::other)?);

    if settings.run_migrations {
        migrate(database_url).await?;
    }

    let pool_config = PoolConfig::new(database_url)
        .with_max_size(settings.db_max_connections())
        .with_connection_timeout(settings.db_connect_timeout());
    let pool = DbPool::new(pool_config).await.map_err(io::Error::other)?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, ServerConfig::new(bind_addr, pool, api_key))?;
    info!(%bind_addr, "lending backend listening");
    server.await
}
