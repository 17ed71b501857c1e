//! Domain primitives, ports and services for peer-to-peer lending.
//!
//! Purpose: keep the borrow-request rules independent of HTTP and storage.
//! Adapters depend on this module, never the other way round.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure taxonomy.
//! - Asset, BorrowRequest and their identifiers and statuses.
//! - BorrowService: the borrow coordinator.
//! - AssetService: owner-side asset management.
//! - UserSyncService: applies identity provider profile events.

mod asset;
mod asset_service;
mod borrow_request;
mod borrow_service;
pub mod error;
pub mod ports;
pub mod sanitize;
mod trace_id;
mod user;
mod user_sync_service;

pub use self::asset::{Asset, AssetDraft, AssetId, AssetStatus, ParseAssetStatusError};
pub use self::asset_service::AssetService;
pub use self::borrow_request::{
    AssetTransition, BorrowAssetSummary, BorrowRequest, BorrowRequestDraft, BorrowRequestId,
    BorrowRequestStatus, BorrowRequestSummary, BorrowRequestUpdate, ParseBorrowRequestStatusError,
    TransitionOutcome, UNAVAILABLE_ASSET_NAME,
};
pub use self::borrow_service::BorrowService;
pub use self::error::{Error, ErrorCode};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{UNKNOWN_USERNAME, USER_ID_MAX, UserId, UserSummary, UserValidationError};
pub use self::user_sync_service::UserSyncService;
