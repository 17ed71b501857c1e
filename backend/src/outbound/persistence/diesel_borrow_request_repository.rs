//! PostgreSQL-backed `BorrowRequestRepository` implementation using Diesel ORM.
//!
//! Every write is guarded on the status the caller last observed. Transitions
//! that also move the asset run inside one transaction, so the request and the
//! asset either both change or neither does.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{BorrowRequestRepository, BorrowRequestRepositoryError};
use crate::domain::{
    AssetId, AssetStatus, AssetTransition, BorrowRequest, BorrowRequestId, BorrowRequestStatus,
    BorrowRequestUpdate, TransitionOutcome, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{BorrowRequestChangeset, BorrowRequestRow};
use super::pool::{DbPool, PoolError};
use super::schema::{assets, borrow_requests};

/// Diesel-backed implementation of the borrow request repository port.
#[derive(Clone)]
pub struct DieselBorrowRequestRepository {
    pool: DbPool,
}

impl DieselBorrowRequestRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BorrowRequestRepositoryError {
    map_basic_pool_error(error, |message| {
        BorrowRequestRepositoryError::connection(message)
    })
}

fn map_diesel_error(error: diesel::result::Error) -> BorrowRequestRepositoryError {
    map_basic_diesel_error(
        error,
        BorrowRequestRepositoryError::query,
        BorrowRequestRepositoryError::connection,
    )
}

fn row_to_request(row: BorrowRequestRow) -> Result<BorrowRequest, BorrowRequestRepositoryError> {
    BorrowRequest::try_from(row).map_err(BorrowRequestRepositoryError::query)
}

fn rows_to_requests(
    rows: Vec<BorrowRequestRow>,
) -> Result<Vec<BorrowRequest>, BorrowRequestRepositoryError> {
    rows.into_iter().map(row_to_request).collect()
}

/// Reasons a transition transaction rolls back.
#[derive(Debug)]
enum TransitionAbort {
    StaleRequest,
    AssetUnavailable,
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for TransitionAbort {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

#[async_trait]
impl BorrowRequestRepository for DieselBorrowRequestRepository {
    async fn insert(&self, request: &BorrowRequest) -> Result<(), BorrowRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(borrow_requests::table)
            .values(BorrowRequestRow::from(request))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &BorrowRequestId,
    ) -> Result<Option<BorrowRequest>, BorrowRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = borrow_requests::table
            .find(*id.as_uuid())
            .select(BorrowRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_request).transpose()
    }

    async fn find_by_borrower(
        &self,
        borrower: &UserId,
    ) -> Result<Vec<BorrowRequest>, BorrowRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = borrow_requests::table
            .filter(borrow_requests::borrower_user_id.eq(borrower.to_string()))
            .order(borrow_requests::requested_at.desc())
            .select(BorrowRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_requests(rows)
    }

    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<BorrowRequest>, BorrowRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = borrow_requests::table
            .filter(borrow_requests::owner_user_id.eq(owner.to_string()))
            .order(borrow_requests::requested_at.desc())
            .select(BorrowRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_requests(rows)
    }

    async fn find_by_asset(
        &self,
        asset: &AssetId,
    ) -> Result<Vec<BorrowRequest>, BorrowRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = borrow_requests::table
            .filter(borrow_requests::asset_id.eq(*asset.as_uuid()))
            .order(borrow_requests::requested_at.desc())
            .select(BorrowRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_requests(rows)
    }

    async fn update_fields(
        &self,
        id: &BorrowRequestId,
        expected: BorrowRequestStatus,
        update: &BorrowRequestUpdate,
    ) -> Result<bool, BorrowRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            borrow_requests::table
                .filter(borrow_requests::id.eq(*id.as_uuid()))
                .filter(borrow_requests::status.eq(expected.as_str())),
        )
        .set(BorrowRequestChangeset::from(update))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn apply_transition(
        &self,
        id: &BorrowRequestId,
        expected: BorrowRequestStatus,
        update: &BorrowRequestUpdate,
        asset: AssetTransition,
    ) -> Result<TransitionOutcome, BorrowRequestRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let request_id = *id.as_uuid();
        let asset_id = *asset.asset_id().as_uuid();
        let changeset = BorrowRequestChangeset::from(update);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result = conn
            .transaction::<_, TransitionAbort, _>(|conn| {
                async move {
                    let moved = diesel::update(
                        borrow_requests::table
                            .filter(borrow_requests::id.eq(request_id))
                            .filter(borrow_requests::status.eq(expected.as_str())),
                    )
                    .set(changeset)
                    .execute(conn)
                    .await?;
                    if moved == 0 {
                        return Err(TransitionAbort::StaleRequest);
                    }

                    let target = asset.target_status().as_str();
                    match asset {
                        AssetTransition::Lend(_) => {
                            let lent = diesel::update(
                                assets::table
                                    .filter(assets::id.eq(asset_id))
                                    .filter(assets::status.eq(AssetStatus::Available.as_str())),
                            )
                            .set((
                                assets::status.eq(target),
                                assets::updated_at.eq(diesel::dsl::now),
                            ))
                            .execute(conn)
                            .await?;
                            if lent == 0 {
                                return Err(TransitionAbort::AssetUnavailable);
                            }
                        }
                        AssetTransition::Release(_) => {
                            // A deleted asset has nothing to release.
                            diesel::update(assets::table.filter(assets::id.eq(asset_id)))
                                .set((
                                    assets::status.eq(target),
                                    assets::updated_at.eq(diesel::dsl::now),
                                ))
                                .execute(conn)
                                .await?;
                        }
                    }
                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(()) => Ok(TransitionOutcome::Applied),
            Err(TransitionAbort::StaleRequest) => {
                debug!(request_id = %id, expected = %expected, "transition lost a status race");
                Ok(TransitionOutcome::StaleRequest)
            }
            Err(TransitionAbort::AssetUnavailable) => Ok(TransitionOutcome::AssetUnavailable),
            Err(TransitionAbort::Diesel(error)) => Err(map_diesel_error(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn diesel_errors_abort_transitions() {
        let abort = TransitionAbort::from(diesel::result::Error::RollbackTransaction);
        assert!(matches!(abort, TransitionAbort::Diesel(_)));
    }

    #[rstest]
    fn closed_connections_map_to_connection_errors() {
        let error = map_pool_error(PoolError::checkout("pool exhausted"));
        assert!(matches!(
            error,
            BorrowRequestRepositoryError::Connection { .. }
        ));
    }
}
