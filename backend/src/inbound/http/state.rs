//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` so they depend only on domain
//! ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AssetCommand, AssetQuery, BorrowCommand, BorrowQuery, UserDirectory, UserSyncCommand,
};

use super::auth::ApiKeyDigest;

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub borrow_commands: Arc<dyn BorrowCommand>,
    pub borrow_queries: Arc<dyn BorrowQuery>,
    pub asset_commands: Arc<dyn AssetCommand>,
    pub asset_queries: Arc<dyn AssetQuery>,
    pub users: Arc<dyn UserDirectory>,
    pub user_sync: Arc<dyn UserSyncCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub borrow_commands: Arc<dyn BorrowCommand>,
    pub borrow_queries: Arc<dyn BorrowQuery>,
    pub asset_commands: Arc<dyn AssetCommand>,
    pub asset_queries: Arc<dyn AssetQuery>,
    pub users: Arc<dyn UserDirectory>,
    pub user_sync: Arc<dyn UserSyncCommand>,
    pub api_key: ApiKeyDigest,
}

impl HttpState {
    /// Construct state from the ports bundle and the digest of the service
    /// API key.
    pub fn new(ports: HttpStatePorts, api_key: ApiKeyDigest) -> Self {
        let HttpStatePorts {
            borrow_commands,
            borrow_queries,
            asset_commands,
            asset_queries,
            users,
            user_sync,
        } = ports;
        Self {
            borrow_commands,
            borrow_queries,
            asset_commands,
            asset_queries,
            users,
            user_sync,
            api_key,
        }
    }
}
