//! Driving port for asset reads.

use async_trait::async_trait;

use crate::domain::{Asset, AssetId, Error, UserId};

/// Driving port for asset reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetQuery: Send + Sync {
    /// Load one asset, failing with `NotFound` when it is missing.
    async fn get(&self, id: AssetId) -> Result<Asset, Error>;

    /// Assets owned by `owner`.
    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Asset>, Error>;
}
