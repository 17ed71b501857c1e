//! HTTP inbound adapter exposing the lending REST endpoints.

pub mod assets;
pub mod auth;
pub mod borrow_requests;
pub mod error;
pub mod health;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`, list routes ahead of `{id}`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(borrow_requests::create_borrow_request)
        .service(borrow_requests::list_borrower_requests)
        .service(borrow_requests::list_owner_requests)
        .service(borrow_requests::get_borrow_request)
        .service(borrow_requests::decide_borrow_request)
        .service(borrow_requests::complete_borrow_request)
        .service(assets::list_assets)
        .service(assets::create_asset)
        .service(assets::get_asset)
        .service(assets::replace_asset)
        .service(assets::set_asset_status)
        .service(assets::delete_asset)
        .service(assets::reconcile_asset)
        .service(users::user_webhook);
}
