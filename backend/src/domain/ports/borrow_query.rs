//! Driving port for borrow-request reads.

use async_trait::async_trait;

use crate::domain::{BorrowRequest, BorrowRequestId, BorrowRequestSummary, Error, UserId};

/// Driving port for borrow-request reads.
///
/// No authorisation happens here: inbound adapters decide who may see a
/// request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowQuery: Send + Sync {
    /// Load a single request, failing with `NotFound` when it is missing.
    async fn get_request(&self, id: BorrowRequestId) -> Result<BorrowRequest, Error>;

    /// Requests the user has made, newest first, with the owner as
    /// counterparty.
    async fn list_for_borrower(&self, borrower: UserId) -> Result<Vec<BorrowRequestSummary>, Error>;

    /// Requests addressed to the user, newest first, with the borrower as
    /// counterparty.
    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<BorrowRequestSummary>, Error>;
}
