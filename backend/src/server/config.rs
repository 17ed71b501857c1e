//! HTTP server configuration object.

use std::net::SocketAddr;

use hippo_backend::inbound::http::auth::ApiKeyDigest;
use hippo_backend::outbound::persistence::DbPool;

/// Everything `create_server` needs beyond the health state.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) api_key: ApiKeyDigest,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, api_key: ApiKeyDigest) -> Self {
        Self {
            bind_addr,
            db_pool,
            api_key,
        }
    }
}
