//! Driving port for owner-side asset management.

use async_trait::async_trait;

use crate::domain::{Asset, AssetDraft, AssetId, AssetStatus, Error, UserId};

/// Driving port for asset writes. Every operation is owner-gated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetCommand: Send + Sync {
    /// Register a new asset for `owner`; it starts out `Available`.
    async fn register(&self, owner: UserId, draft: AssetDraft) -> Result<Asset, Error>;

    /// Replace the descriptive fields of an asset, keeping its status.
    async fn replace(&self, id: AssetId, owner: UserId, draft: AssetDraft)
    -> Result<Asset, Error>;

    /// Move an asset between `Available`, `InRepair` and `Unlisted`.
    ///
    /// `Borrowed` is reserved for the borrow lifecycle and rejected in either
    /// direction.
    async fn set_status(
        &self,
        id: AssetId,
        owner: UserId,
        status: AssetStatus,
    ) -> Result<Asset, Error>;

    /// Delete an asset that is not currently lent out.
    async fn delete(&self, id: AssetId, owner: UserId) -> Result<(), Error>;
}
