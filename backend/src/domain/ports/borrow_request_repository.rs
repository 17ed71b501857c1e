//! Port for borrow request persistence.
//!
//! Writes are guarded by the status the caller read: an update only lands
//! while the stored request still has `expected` status. This makes a repeated
//! or concurrent decision a no-op instead of a second transition.

use async_trait::async_trait;

use crate::domain::{
    AssetId, AssetTransition, BorrowRequest, BorrowRequestId, BorrowRequestStatus,
    BorrowRequestUpdate, TransitionOutcome, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by borrow request repository adapters.
    pub enum BorrowRequestRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "borrow request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "borrow request repository query failed: {message}",
    }
}

/// Port for reading and writing borrow requests.
///
/// List operations return requests ordered by `requested_at`, newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowRequestRepository: Send + Sync {
    /// Persist a new request.
    async fn insert(&self, request: &BorrowRequest) -> Result<(), BorrowRequestRepositoryError>;

    /// Find a request by id.
    async fn find_by_id(
        &self,
        id: &BorrowRequestId,
    ) -> Result<Option<BorrowRequest>, BorrowRequestRepositoryError>;

    /// Requests made by `borrower`.
    async fn find_by_borrower(
        &self,
        borrower: &UserId,
    ) -> Result<Vec<BorrowRequest>, BorrowRequestRepositoryError>;

    /// Requests addressed to `owner`.
    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<BorrowRequest>, BorrowRequestRepositoryError>;

    /// Requests referencing `asset`.
    async fn find_by_asset(
        &self,
        asset: &AssetId,
    ) -> Result<Vec<BorrowRequest>, BorrowRequestRepositoryError>;

    /// Write the mutable request fields when the stored status equals
    /// `expected`. Returns `false` when nothing matched.
    async fn update_fields(
        &self,
        id: &BorrowRequestId,
        expected: BorrowRequestStatus,
        update: &BorrowRequestUpdate,
    ) -> Result<bool, BorrowRequestRepositoryError>;

    /// Write the request fields and the asset status in one transaction.
    ///
    /// Either both writes become visible or neither does.
    async fn apply_transition(
        &self,
        id: &BorrowRequestId,
        expected: BorrowRequestStatus,
        update: &BorrowRequestUpdate,
        asset: AssetTransition,
    ) -> Result<TransitionOutcome, BorrowRequestRepositoryError>;
}
