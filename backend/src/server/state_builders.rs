//! Wire the Diesel adapters into the services behind the HTTP ports.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use hippo_backend::domain::{AssetService, BorrowService, UserSyncService};
use hippo_backend::inbound::http::state::{HttpState, HttpStatePorts};
use hippo_backend::outbound::persistence::{
    DieselAssetRepository, DieselBorrowRequestRepository, DieselUserDirectory,
};

use super::ServerConfig;

/// Build handler state over the configured connection pool.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let assets = Arc::new(DieselAssetRepository::new(config.db_pool.clone()));
    let requests = Arc::new(DieselBorrowRequestRepository::new(config.db_pool.clone()));
    let users = Arc::new(DieselUserDirectory::new(config.db_pool.clone()));

    let borrow = Arc::new(BorrowService::new(
        Arc::clone(&assets),
        requests,
        Arc::clone(&users),
        Arc::new(DefaultClock),
    ));
    let asset_service = Arc::new(AssetService::new(assets));
    let user_sync = Arc::new(UserSyncService::new(Arc::clone(&users)));

    web::Data::new(HttpState::new(
        HttpStatePorts {
            borrow_commands: borrow.clone(),
            borrow_queries: borrow,
            asset_commands: asset_service.clone(),
            asset_queries: asset_service,
            users,
            user_sync,
        },
        config.api_key.clone(),
    ))
}
