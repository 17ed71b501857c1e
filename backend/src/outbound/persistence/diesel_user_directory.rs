//! PostgreSQL-backed `UserDirectory` and `UserRegistry` implementation using
//! Diesel ORM.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserDirectory, UserDirectoryError, UserRegistry};
use crate::domain::{UserId, UserSummary};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user directory port.
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    /// Create a new directory with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserDirectoryError {
    map_basic_pool_error(error, |message| UserDirectoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> UserDirectoryError {
    map_basic_diesel_error(
        error,
        UserDirectoryError::query,
        UserDirectoryError::connection,
    )
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn find_many_by_ids(
        &self,
        ids: &[UserId],
    ) -> Result<HashMap<UserId, UserSummary>, UserDirectoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let raw_ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(&raw_ids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| {
                let summary = UserSummary::try_from(row).map_err(UserDirectoryError::query)?;
                Ok((summary.id.clone(), summary))
            })
            .collect()
    }
}

#[async_trait]
impl UserRegistry for DieselUserDirectory {
    async fn upsert(&self, user: &UserSummary) -> Result<(), UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .on_conflict(users::id)
            .do_update()
            .set(UserProfileChangeset::from(user))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn remove(&self, id: &UserId) -> Result<bool, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.find(id.as_ref()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
