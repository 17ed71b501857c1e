//! Borrow coordinator.
//!
//! Implements the borrow-request driving ports on top of the asset, borrow
//! request and user directory ports. Every operation re-reads the records it
//! acts on; no state is held between calls.
//!
//! Approving and completing a request change the request and the asset in a
//! single repository transaction, guarded by the request status that was
//! read. A guard miss means another decision won the race, and the caller
//! gets the current request back unchanged.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AssetRepository, BorrowCommand, BorrowQuery, BorrowRequestRepository,
    BorrowRequestRepositoryError, CompleteBorrowRequest, CreateBorrowRequest,
    DecideBorrowRequest, UserDirectory, UserDirectoryError,
};
use crate::domain::sanitize::clean_text;
use crate::domain::{
    Asset, AssetId, AssetStatus, AssetTransition, BorrowAssetSummary, BorrowRequest,
    BorrowRequestDraft, BorrowRequestId, BorrowRequestStatus, BorrowRequestSummary,
    BorrowRequestUpdate, Error, TransitionOutcome, UserId, UserSummary,
};

use super::asset_service::map_asset_repository_error;

fn map_request_repository_error(error: BorrowRequestRepositoryError) -> Error {
    match error {
        BorrowRequestRepositoryError::Connection { message } => {
            warn!(%message, "borrow request repository unavailable");
            Error::service_unavailable(format!("borrow request repository unavailable: {message}"))
        }
        BorrowRequestRepositoryError::Query { message } => {
            warn!(%message, "borrow request repository query failed");
            Error::internal(format!("borrow request repository error: {message}"))
        }
    }
}

pub(super) fn map_directory_error(error: UserDirectoryError) -> Error {
    match error {
        UserDirectoryError::Connection { message } => {
            Error::service_unavailable(format!("user directory unavailable: {message}"))
        }
        UserDirectoryError::Query { message } => {
            Error::internal(format!("user directory error: {message}"))
        }
    }
}

fn rule_violation(message: &str, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "code": code }))
}

fn ensure_lendable(asset: &Asset, borrower: &UserId) -> Result<(), Error> {
    if asset.is_owned_by(borrower) {
        return Err(rule_violation(
            "you cannot borrow your own asset",
            "self_borrow",
        ));
    }
    match asset.status {
        AssetStatus::Available => Ok(()),
        AssetStatus::Borrowed => Err(rule_violation(
            "asset is already borrowed",
            "already_borrowed",
        )),
        AssetStatus::InRepair | AssetStatus::Unlisted => Err(rule_violation(
            "asset is not available for borrowing",
            "asset_unavailable",
        )),
    }
}

fn ensure_window(
    from: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
) -> Result<(), Error> {
    match (from, until) {
        (Some(from), Some(until)) if from > until => Err(rule_violation(
            "requested window ends before it starts",
            "invalid_window",
        )),
        _ => Ok(()),
    }
}

fn ensure_owner(request: &BorrowRequest, acting_user: &UserId) -> Result<(), Error> {
    if request.is_owned_by(acting_user) {
        Ok(())
    } else {
        Err(Error::forbidden(
            "only the asset owner can act on this borrow request",
        ))
    }
}

fn newest_first(requests: &mut [BorrowRequest]) {
    requests.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
}

/// Which party of a request a listing shows as the counterparty.
#[derive(Debug, Clone, Copy)]
enum Counterparty {
    Owner,
    Borrower,
}

impl Counterparty {
    fn of(self, request: &BorrowRequest) -> &UserId {
        match self {
            Self::Owner => &request.owner_user_id,
            Self::Borrower => &request.borrower_user_id,
        }
    }
}

/// Status an asset should have given how many approved requests reference
/// it, or `None` when the stored status is already consistent.
fn reconciled_status(current: AssetStatus, approved: usize) -> Option<AssetStatus> {
    match (approved, current) {
        (0, AssetStatus::Borrowed) => Some(AssetStatus::Available),
        (0, _) | (_, AssetStatus::Borrowed) => None,
        (_, _) => Some(AssetStatus::Borrowed),
    }
}

/// Borrow coordinator implementing [`BorrowCommand`] and [`BorrowQuery`].
#[derive(Clone)]
pub struct BorrowService<A, R, U> {
    assets: Arc<A>,
    requests: Arc<R>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<A, R, U> BorrowService<A, R, U> {
    /// Create a coordinator over the given stores.
    pub fn new(assets: Arc<A>, requests: Arc<R>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            assets,
            requests,
            users,
            clock,
        }
    }
}

impl<A, R, U> BorrowService<A, R, U>
where
    A: AssetRepository,
    R: BorrowRequestRepository,
    U: UserDirectory,
{
    async fn load_asset(&self, id: &AssetId) -> Result<Asset, Error> {
        self.assets
            .find_by_id(id)
            .await
            .map_err(map_asset_repository_error)?
            .ok_or_else(|| Error::not_found(format!("asset {id} not found")))
    }

    async fn load_request(&self, id: &BorrowRequestId) -> Result<BorrowRequest, Error> {
        self.requests
            .find_by_id(id)
            .await
            .map_err(map_request_repository_error)?
            .ok_or_else(|| Error::not_found(format!("borrow request {id} not found")))
    }

    /// Turn the outcome of a guarded write into the caller-visible request.
    async fn settle(
        &self,
        mut request: BorrowRequest,
        update: &BorrowRequestUpdate,
        outcome: TransitionOutcome,
    ) -> Result<BorrowRequest, Error> {
        match outcome {
            TransitionOutcome::Applied => {
                request.apply(update);
                info!(
                    request_id = %request.id,
                    asset_id = %request.asset_id,
                    status = %request.status,
                    "borrow request transitioned"
                );
                Ok(request)
            }
            TransitionOutcome::StaleRequest => {
                info!(
                    request_id = %request.id,
                    "borrow request changed concurrently; returning current state"
                );
                self.load_request(&request.id).await
            }
            TransitionOutcome::AssetUnavailable => Err(rule_violation(
                "asset is not available for lending",
                "asset_unavailable",
            )),
        }
    }

    async fn summarise(
        &self,
        mut requests: Vec<BorrowRequest>,
        counterparty: Counterparty,
    ) -> Result<Vec<BorrowRequestSummary>, Error> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        newest_first(&mut requests);

        let asset_ids: Vec<AssetId> = requests
            .iter()
            .map(|request| request.asset_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let user_ids: Vec<UserId> = requests
            .iter()
            .map(|request| counterparty.of(request).clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let assets: HashMap<AssetId, Asset> = self
            .assets
            .find_many_by_ids(&asset_ids)
            .await
            .map_err(map_asset_repository_error)?
            .into_iter()
            .map(|asset| (asset.id, asset))
            .collect();
        let users = self
            .users
            .find_many_by_ids(&user_ids)
            .await
            .map_err(map_directory_error)?;

        Ok(requests
            .into_iter()
            .map(|request| {
                let asset = assets.get(&request.asset_id).map_or_else(
                    || BorrowAssetSummary::unavailable(request.asset_id),
                    BorrowAssetSummary::from,
                );
                let party = counterparty.of(&request).clone();
                let profile = users
                    .get(&party)
                    .cloned()
                    .unwrap_or_else(|| UserSummary::unknown(party));
                BorrowRequestSummary {
                    request,
                    asset,
                    counterparty: profile,
                }
            })
            .collect())
    }
}

#[async_trait]
impl<A, R, U> BorrowCommand for BorrowService<A, R, U>
where
    A: AssetRepository,
    R: BorrowRequestRepository,
    U: UserDirectory,
{
    async fn create_request(&self, request: CreateBorrowRequest) -> Result<BorrowRequest, Error> {
        let CreateBorrowRequest {
            asset_id,
            borrower,
            message,
            requested_from,
            requested_until,
        } = request;

        let asset = self.load_asset(&asset_id).await?;
        ensure_lendable(&asset, &borrower)?;
        ensure_window(requested_from, requested_until)?;

        let borrow = BorrowRequest::open(
            BorrowRequestDraft {
                id: BorrowRequestId::random(),
                asset_id,
                owner_user_id: asset.owner_user_id,
                borrower_user_id: borrower,
                message: clean_text(message.as_deref()),
                requested_from,
                requested_until,
            },
            self.clock.utc(),
        );

        self.requests
            .insert(&borrow)
            .await
            .map_err(map_request_repository_error)?;

        info!(
            request_id = %borrow.id,
            asset_id = %borrow.asset_id,
            borrower = %borrow.borrower_user_id,
            "borrow request created"
        );
        Ok(borrow)
    }

    async fn decide(&self, request: DecideBorrowRequest) -> Result<BorrowRequest, Error> {
        let DecideBorrowRequest {
            request_id,
            acting_user,
            approve,
            note,
            due_at,
        } = request;

        let current = self.load_request(&request_id).await?;
        ensure_owner(&current, &acting_user)?;

        let Some(update) =
            current.decide(approve, self.clock.utc(), clean_text(note.as_deref()), due_at)
        else {
            return Ok(current);
        };

        let outcome = if approve {
            self.requests
                .apply_transition(
                    &request_id,
                    BorrowRequestStatus::Pending,
                    &update,
                    AssetTransition::Lend(current.asset_id),
                )
                .await
                .map_err(map_request_repository_error)?
        } else {
            let written = self
                .requests
                .update_fields(&request_id, BorrowRequestStatus::Pending, &update)
                .await
                .map_err(map_request_repository_error)?;
            if written {
                TransitionOutcome::Applied
            } else {
                TransitionOutcome::StaleRequest
            }
        };

        self.settle(current, &update, outcome).await
    }

    async fn complete(&self, request: CompleteBorrowRequest) -> Result<BorrowRequest, Error> {
        let CompleteBorrowRequest {
            request_id,
            acting_user,
            note,
        } = request;

        let current = self.load_request(&request_id).await?;
        ensure_owner(&current, &acting_user)?;

        let Some(update) = current.complete(self.clock.utc(), clean_text(note.as_deref())) else {
            return Ok(current);
        };

        let outcome = self
            .requests
            .apply_transition(
                &request_id,
                BorrowRequestStatus::Approved,
                &update,
                AssetTransition::Release(current.asset_id),
            )
            .await
            .map_err(map_request_repository_error)?;

        self.settle(current, &update, outcome).await
    }

    async fn reconcile_asset(
        &self,
        asset_id: AssetId,
        acting_user: UserId,
    ) -> Result<Asset, Error> {
        let mut asset = self.load_asset(&asset_id).await?;
        if !asset.is_owned_by(&acting_user) {
            return Err(Error::forbidden("only the asset owner can reconcile it"));
        }

        let approved = self
            .requests
            .find_by_asset(&asset_id)
            .await
            .map_err(map_request_repository_error)?
            .iter()
            .filter(|request| request.status == BorrowRequestStatus::Approved)
            .count();
        if approved > 1 {
            warn!(%asset_id, approved, "asset has more than one approved borrow request");
        }

        let Some(status) = reconciled_status(asset.status, approved) else {
            return Ok(asset);
        };
        let updated = self
            .assets
            .update_status(&asset_id, asset.status, status)
            .await
            .map_err(map_asset_repository_error)?;
        if !updated {
            self.load_asset(&asset_id).await?;
            return Err(Error::conflict(
                "asset status changed during reconciliation; retry",
            ));
        }

        warn!(%asset_id, from = %asset.status, to = %status, "asset status repaired");
        asset.status = status;
        Ok(asset)
    }
}

#[async_trait]
impl<A, R, U> BorrowQuery for BorrowService<A, R, U>
where
    A: AssetRepository,
    R: BorrowRequestRepository,
    U: UserDirectory,
{
    async fn get_request(&self, id: BorrowRequestId) -> Result<BorrowRequest, Error> {
        self.load_request(&id).await
    }

    async fn list_for_borrower(&self, borrower: UserId) -> Result<Vec<BorrowRequestSummary>, Error> {
        let requests = self
            .requests
            .find_by_borrower(&borrower)
            .await
            .map_err(map_request_repository_error)?;
        self.summarise(requests, Counterparty::Owner).await
    }

    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<BorrowRequestSummary>, Error> {
        let requests = self
            .requests
            .find_by_owner(&owner)
            .await
            .map_err(map_request_repository_error)?;
        self.summarise(requests, Counterparty::Borrower).await
    }
}

#[cfg(test)]
#[path = "borrow_service_tests.rs"]
mod tests;
