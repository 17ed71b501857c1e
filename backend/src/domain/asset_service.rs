//! Owner-side asset catalogue service.
//!
//! Everything here is plain record keeping apart from the `Borrowed` status,
//! which belongs to the borrow coordinator and cannot be set, cleared or
//! deleted through this service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{AssetCommand, AssetQuery, AssetRepository, AssetRepositoryError};
use crate::domain::sanitize::clean_text;
use crate::domain::{Asset, AssetDraft, AssetId, AssetStatus, Error, UserId};

pub(super) fn map_asset_repository_error(error: AssetRepositoryError) -> Error {
    match error {
        AssetRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("asset repository unavailable: {message}"))
        }
        AssetRepositoryError::Query { message } => {
            Error::internal(format!("asset repository error: {message}"))
        }
    }
}

fn clean_draft(draft: AssetDraft) -> Result<AssetDraft, Error> {
    let item_name = clean_text(Some(&draft.item_name))
        .ok_or_else(|| Error::invalid_request("item name must not be empty"))?;
    Ok(AssetDraft {
        item_name,
        brand_name: clean_text(draft.brand_name.as_deref()),
        category: clean_text(draft.category.as_deref()),
        current_location: clean_text(draft.current_location.as_deref()),
        images: draft
            .images
            .into_iter()
            .filter_map(|url| clean_text(Some(&url)))
            .collect(),
        condition_description: clean_text(draft.condition_description.as_deref()),
        favorite: draft.favorite,
    })
}

/// Asset service implementing [`AssetCommand`] and [`AssetQuery`].
#[derive(Clone)]
pub struct AssetService<A> {
    assets: Arc<A>,
}

impl<A> AssetService<A> {
    /// Create a new service over the asset repository.
    pub fn new(assets: Arc<A>) -> Self {
        Self { assets }
    }
}

impl<A> AssetService<A>
where
    A: AssetRepository,
{
    async fn load_owned(&self, id: &AssetId, owner: &UserId) -> Result<Asset, Error> {
        let asset = self
            .assets
            .find_by_id(id)
            .await
            .map_err(map_asset_repository_error)?
            .ok_or_else(|| Error::not_found(format!("asset {id} not found")))?;
        if asset.is_owned_by(owner) {
            Ok(asset)
        } else {
            Err(Error::forbidden("only the asset owner can change it"))
        }
    }

    fn missing(id: &AssetId) -> Error {
        Error::not_found(format!("asset {id} not found"))
    }

    /// Re-read an asset after a guarded write matched no row.
    async fn current_status(&self, id: &AssetId) -> Result<AssetStatus, Error> {
        self.assets
            .find_by_id(id)
            .await
            .map_err(map_asset_repository_error)?
            .map(|asset| asset.status)
            .ok_or_else(|| Self::missing(id))
    }
}

fn lent_out_error() -> Error {
    Error::conflict("asset is currently lent out")
}

fn borrowed_status_error() -> Error {
    Error::invalid_request("borrowed status is managed by borrow requests")
}

#[async_trait]
impl<A> AssetCommand for AssetService<A>
where
    A: AssetRepository,
{
    async fn register(&self, owner: UserId, draft: AssetDraft) -> Result<Asset, Error> {
        let asset = Asset::register(AssetId::random(), owner, clean_draft(draft)?);
        self.assets
            .insert(&asset)
            .await
            .map_err(map_asset_repository_error)?;
        info!(asset_id = %asset.id, owner = %asset.owner_user_id, "asset registered");
        Ok(asset)
    }

    async fn replace(
        &self,
        id: AssetId,
        owner: UserId,
        draft: AssetDraft,
    ) -> Result<Asset, Error> {
        let current = self.load_owned(&id, &owner).await?;
        let mut replacement = Asset::register(id, current.owner_user_id, clean_draft(draft)?);
        replacement.status = current.status;

        let replaced = self
            .assets
            .replace(&replacement)
            .await
            .map_err(map_asset_repository_error)?;
        if !replaced {
            return Err(Self::missing(&id));
        }
        Ok(replacement)
    }

    async fn set_status(
        &self,
        id: AssetId,
        owner: UserId,
        status: AssetStatus,
    ) -> Result<Asset, Error> {
        let mut asset = self.load_owned(&id, &owner).await?;
        if status == AssetStatus::Borrowed || asset.status == AssetStatus::Borrowed {
            return Err(borrowed_status_error());
        }
        if asset.status == status {
            return Ok(asset);
        }

        let updated = self
            .assets
            .update_status(&id, asset.status, status)
            .await
            .map_err(map_asset_repository_error)?;
        if !updated {
            return Err(match self.current_status(&id).await? {
                AssetStatus::Borrowed => borrowed_status_error(),
                _ => Error::conflict("asset status changed concurrently; reload and retry"),
            });
        }
        info!(asset_id = %id, from = %asset.status, to = %status, "asset status changed by owner");
        asset.status = status;
        Ok(asset)
    }

    async fn delete(&self, id: AssetId, owner: UserId) -> Result<(), Error> {
        let asset = self.load_owned(&id, &owner).await?;
        if asset.status == AssetStatus::Borrowed {
            return Err(lent_out_error());
        }
        let deleted = self
            .assets
            .delete(&id)
            .await
            .map_err(map_asset_repository_error)?;
        if !deleted {
            self.current_status(&id).await?;
            return Err(lent_out_error());
        }
        info!(asset_id = %id, "asset deleted");
        Ok(())
    }
}

#[async_trait]
impl<A> AssetQuery for AssetService<A>
where
    A: AssetRepository,
{
    async fn get(&self, id: AssetId) -> Result<Asset, Error> {
        self.assets
            .find_by_id(&id)
            .await
            .map_err(map_asset_repository_error)?
            .ok_or_else(|| Self::missing(&id))
    }

    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Asset>, Error> {
        self.assets
            .find_by_owner(&owner)
            .await
            .map_err(map_asset_repository_error)
    }
}
