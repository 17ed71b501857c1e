//! PostgreSQL-backed `AssetRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AssetRepository, AssetRepositoryError};
use crate::domain::{Asset, AssetId, AssetStatus, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AssetDetailsChangeset, AssetRow};
use super::pool::{DbPool, PoolError};
use super::schema::assets;

/// Diesel-backed implementation of the asset repository port.
#[derive(Clone)]
pub struct DieselAssetRepository {
    pool: DbPool,
}

impl DieselAssetRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AssetRepositoryError {
    map_basic_pool_error(error, |message| AssetRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> AssetRepositoryError {
    map_basic_diesel_error(
        error,
        AssetRepositoryError::query,
        AssetRepositoryError::connection,
    )
}

fn row_to_asset(row: AssetRow) -> Result<Asset, AssetRepositoryError> {
    Asset::try_from(row).map_err(AssetRepositoryError::query)
}

#[async_trait]
impl AssetRepository for DieselAssetRepository {
    async fn find_by_id(&self, id: &AssetId) -> Result<Option<Asset>, AssetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = assets::table
            .find(*id.as_uuid())
            .select(AssetRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_asset).transpose()
    }

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Asset>, AssetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AssetRow> = assets::table
            .filter(assets::owner_user_id.eq(owner.to_string()))
            .order(assets::created_at.desc())
            .select(AssetRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_asset).collect()
    }

    async fn find_many_by_ids(&self, ids: &[AssetId]) -> Result<Vec<Asset>, AssetRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AssetRow> = assets::table
            .filter(assets::id.eq_any(&uuids))
            .select(AssetRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_asset).collect()
    }

    async fn update_status(
        &self,
        id: &AssetId,
        expected: AssetStatus,
        status: AssetStatus,
    ) -> Result<bool, AssetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = assets::table
            .find(*id.as_uuid())
            .filter(assets::status.eq(expected.as_str()));
        let updated = diesel::update(target)
            .set((
                assets::status.eq(status.as_str()),
                assets::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn insert(&self, asset: &Asset) -> Result<(), AssetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(assets::table)
            .values(AssetRow::from(asset))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn replace(&self, asset: &Asset) -> Result<bool, AssetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(assets::table.find(*asset.id.as_uuid()))
            .set((
                AssetDetailsChangeset::from(asset),
                assets::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &AssetId) -> Result<bool, AssetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = assets::table
            .find(*id.as_uuid())
            .filter(assets::status.ne(AssetStatus::Borrowed.as_str()));
        let deleted = diesel::delete(target)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
