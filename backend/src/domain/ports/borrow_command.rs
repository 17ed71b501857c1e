//! Driving port for the borrow-request lifecycle.
//!
//! Callers pass the authenticated user id; the port trusts it and performs
//! the ownership checks itself.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Asset, AssetId, BorrowRequest, BorrowRequestId, Error, UserId};

/// Request to borrow an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBorrowRequest {
    pub asset_id: AssetId,
    pub borrower: UserId,
    pub message: Option<String>,
    pub requested_from: Option<DateTime<Utc>>,
    pub requested_until: Option<DateTime<Utc>>,
}

/// The owner's approval or denial of a pending request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecideBorrowRequest {
    pub request_id: BorrowRequestId,
    pub acting_user: UserId,
    pub approve: bool,
    pub note: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
}

/// The owner's confirmation that a lent asset came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteBorrowRequest {
    pub request_id: BorrowRequestId,
    pub acting_user: UserId,
    pub note: Option<String>,
}

/// Driving port for borrow-request writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowCommand: Send + Sync {
    /// Open a pending request against an available asset.
    ///
    /// Fails with `NotFound` for an unknown asset and `InvalidRequest` when
    /// the borrower owns the asset or the asset is not available.
    async fn create_request(&self, request: CreateBorrowRequest) -> Result<BorrowRequest, Error>;

    /// Approve or deny a pending request.
    ///
    /// Only the request's owner may decide (`Forbidden` otherwise). A request
    /// that is no longer pending is returned unchanged.
    async fn decide(&self, request: DecideBorrowRequest) -> Result<BorrowRequest, Error>;

    /// Mark an approved request as returned and release the asset.
    ///
    /// Only the request's owner may complete (`Forbidden` otherwise). A
    /// request that is not approved is returned unchanged.
    async fn complete(&self, request: CompleteBorrowRequest) -> Result<BorrowRequest, Error>;

    /// Recompute an asset's status from its approved borrow requests and
    /// repair it when the two disagree.
    async fn reconcile_asset(&self, asset_id: AssetId, acting_user: UserId)
    -> Result<Asset, Error>;
}
