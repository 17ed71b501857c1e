//! Port for asset persistence.
//!
//! Status changes go through [`AssetRepository::update_status`], a targeted
//! single-column write, so they never clobber concurrent edits to the
//! descriptive fields and vice versa. Both status writes and deletes are
//! conditional on the stored status, so a decision made on a stale read
//! cannot overwrite or drop an asset the coordinator has just lent out.

use async_trait::async_trait;

use crate::domain::{Asset, AssetId, AssetStatus, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by asset repository adapters.
    pub enum AssetRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "asset repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "asset repository query failed: {message}",
    }
}

/// Port for reading and writing asset records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Find an asset by id.
    async fn find_by_id(&self, id: &AssetId) -> Result<Option<Asset>, AssetRepositoryError>;

    /// List every asset owned by `owner`.
    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Asset>, AssetRepositoryError>;

    /// Fetch all assets whose id is in `ids` in one round trip.
    ///
    /// Unknown ids are skipped rather than reported.
    async fn find_many_by_ids(&self, ids: &[AssetId]) -> Result<Vec<Asset>, AssetRepositoryError>;

    /// Set the status column only, provided the stored status is still
    /// `expected`. Returns `false` when the asset is missing or its status
    /// has moved on.
    async fn update_status(
        &self,
        id: &AssetId,
        expected: AssetStatus,
        status: AssetStatus,
    ) -> Result<bool, AssetRepositoryError>;

    /// Persist a new asset.
    async fn insert(&self, asset: &Asset) -> Result<(), AssetRepositoryError>;

    /// Overwrite the descriptive fields of an existing asset.
    ///
    /// Owner and status are left as stored. Returns `false` when the asset is
    /// missing.
    async fn replace(&self, asset: &Asset) -> Result<bool, AssetRepositoryError>;

    /// Remove an asset unless it is currently borrowed. Returns `false` when
    /// the asset is missing or lent out.
    async fn delete(&self, id: &AssetId) -> Result<bool, AssetRepositoryError>;
}
