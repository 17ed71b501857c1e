//! Test utilities for the backend crate.
//!
//! Provides an in-memory lending store implementing every driven port plus a
//! fixed clock, shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and behind the `test-support` feature.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use mockable::Clock;

use crate::domain::ports::{
    AssetRepository, AssetRepositoryError, BorrowRequestRepository, BorrowRequestRepositoryError,
    UserDirectory, UserDirectoryError, UserRegistry,
};
use crate::domain::{
    Asset, AssetId, AssetStatus, AssetTransition, BorrowRequest, BorrowRequestId,
    BorrowRequestStatus, BorrowRequestUpdate, TransitionOutcome, UserId, UserSummary,
};

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
struct LendingState {
    assets: HashMap<AssetId, Asset>,
    requests: HashMap<BorrowRequestId, BorrowRequest>,
    users: HashMap<UserId, UserSummary>,
}

/// In-memory store backing the asset, borrow request and user profile
/// ports. A single lock makes every write atomic across records.
#[derive(Default)]
pub struct InMemoryLending {
    state: Mutex<LendingState>,
}

impl InMemoryLending {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LendingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current snapshot of a user profile.
    pub fn user(&self, id: &UserId) -> Option<UserSummary> {
        self.lock().users.get(id).cloned()
    }

    /// Register a user profile.
    pub fn add_user(&self, summary: UserSummary) {
        self.lock().users.insert(summary.id.clone(), summary);
    }

    /// Store an asset directly, bypassing any service rules.
    pub fn put_asset(&self, asset: Asset) {
        self.lock().assets.insert(asset.id, asset);
    }

    /// Store a borrow request directly, bypassing the coordinator.
    pub fn put_request(&self, request: BorrowRequest) {
        self.lock().requests.insert(request.id, request);
    }

    /// Drop an asset directly, leaving any borrow requests dangling.
    pub fn remove_asset(&self, id: &AssetId) {
        self.lock().assets.remove(id);
    }

    /// Force an asset status, simulating drift or a partial write.
    pub fn force_asset_status(&self, id: &AssetId, status: AssetStatus) {
        if let Some(asset) = self.lock().assets.get_mut(id) {
            asset.status = status;
        }
    }

    /// Current snapshot of an asset.
    pub fn asset(&self, id: &AssetId) -> Option<Asset> {
        self.lock().assets.get(id).cloned()
    }

    /// Current snapshot of a borrow request.
    pub fn request(&self, id: &BorrowRequestId) -> Option<BorrowRequest> {
        self.lock().requests.get(id).cloned()
    }

    fn newest_first(mut requests: Vec<BorrowRequest>) -> Vec<BorrowRequest> {
        requests.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        requests
    }

    fn matching<F>(&self, predicate: F) -> Vec<BorrowRequest>
    where
        F: Fn(&BorrowRequest) -> bool,
    {
        let found = self
            .lock()
            .requests
            .values()
            .filter(|request| predicate(request))
            .cloned()
            .collect();
        Self::newest_first(found)
    }
}

#[async_trait]
impl AssetRepository for InMemoryLending {
    async fn find_by_id(&self, id: &AssetId) -> Result<Option<Asset>, AssetRepositoryError> {
        Ok(self.asset(id))
    }

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Asset>, AssetRepositoryError> {
        Ok(self
            .lock()
            .assets
            .values()
            .filter(|asset| asset.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn find_many_by_ids(&self, ids: &[AssetId]) -> Result<Vec<Asset>, AssetRepositoryError> {
        let state = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| state.assets.get(id).cloned())
            .collect())
    }

    async fn update_status(
        &self,
        id: &AssetId,
        expected: AssetStatus,
        status: AssetStatus,
    ) -> Result<bool, AssetRepositoryError> {
        match self.lock().assets.get_mut(id) {
            Some(asset) if asset.status == expected => {
                asset.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert(&self, asset: &Asset) -> Result<(), AssetRepositoryError> {
        let mut state = self.lock();
        if state.assets.contains_key(&asset.id) {
            return Err(AssetRepositoryError::query("duplicate asset id"));
        }
        state.assets.insert(asset.id, asset.clone());
        Ok(())
    }

    async fn replace(&self, asset: &Asset) -> Result<bool, AssetRepositoryError> {
        let mut state = self.lock();
        let Some(stored) = state.assets.get_mut(&asset.id) else {
            return Ok(false);
        };
        let status = stored.status;
        let owner = stored.owner_user_id.clone();
        *stored = asset.clone();
        stored.status = status;
        stored.owner_user_id = owner;
        Ok(true)
    }

    async fn delete(&self, id: &AssetId) -> Result<bool, AssetRepositoryError> {
        let mut state = self.lock();
        match state.assets.get(id) {
            Some(asset) if asset.status != AssetStatus::Borrowed => {
                state.assets.remove(id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl BorrowRequestRepository for InMemoryLending {
    async fn insert(&self, request: &BorrowRequest) -> Result<(), BorrowRequestRepositoryError> {
        let mut state = self.lock();
        if state.requests.contains_key(&request.id) {
            return Err(BorrowRequestRepositoryError::query("duplicate request id"));
        }
        state.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &BorrowRequestId,
    ) -> Result<Option<BorrowRequest>, BorrowRequestRepositoryError> {
        Ok(self.request(id))
    }

    async fn find_by_borrower(
        &self,
        borrower: &UserId,
    ) -> Result<Vec<BorrowRequest>, BorrowRequestRepositoryError> {
        Ok(self.matching(|request| &request.borrower_user_id == borrower))
    }

    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<BorrowRequest>, BorrowRequestRepositoryError> {
        Ok(self.matching(|request| &request.owner_user_id == owner))
    }

    async fn find_by_asset(
        &self,
        asset: &AssetId,
    ) -> Result<Vec<BorrowRequest>, BorrowRequestRepositoryError> {
        Ok(self.matching(|request| &request.asset_id == asset))
    }

    async fn update_fields(
        &self,
        id: &BorrowRequestId,
        expected: BorrowRequestStatus,
        update: &BorrowRequestUpdate,
    ) -> Result<bool, BorrowRequestRepositoryError> {
        let mut state = self.lock();
        match state.requests.get_mut(id) {
            Some(request) if request.status == expected => {
                request.apply(update);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn apply_transition(
        &self,
        id: &BorrowRequestId,
        expected: BorrowRequestStatus,
        update: &BorrowRequestUpdate,
        asset: AssetTransition,
    ) -> Result<TransitionOutcome, BorrowRequestRepositoryError> {
        let mut state = self.lock();
        let LendingState {
            assets, requests, ..
        } = &mut *state;

        let Some(request) = requests.get_mut(id).filter(|r| r.status == expected) else {
            return Ok(TransitionOutcome::StaleRequest);
        };
        match (asset, assets.get_mut(&asset.asset_id())) {
            (AssetTransition::Lend(_), Some(stored)) if stored.status == AssetStatus::Available => {
                stored.status = AssetStatus::Borrowed;
            }
            (AssetTransition::Lend(_), _) => return Ok(TransitionOutcome::AssetUnavailable),
            (AssetTransition::Release(_), Some(stored)) => {
                stored.status = AssetStatus::Available;
            }
            (AssetTransition::Release(_), None) => {}
        }
        request.apply(update);
        Ok(TransitionOutcome::Applied)
    }
}

#[async_trait]
impl UserDirectory for InMemoryLending {
    async fn find_many_by_ids(
        &self,
        ids: &[UserId],
    ) -> Result<HashMap<UserId, UserSummary>, UserDirectoryError> {
        let state = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| {
                state
                    .users
                    .get(id)
                    .map(|summary| (id.clone(), summary.clone()))
            })
            .collect())
    }
}

#[async_trait]
impl UserRegistry for InMemoryLending {
    async fn upsert(&self, user: &UserSummary) -> Result<(), UserDirectoryError> {
        self.add_user(user.clone());
        Ok(())
    }

    async fn remove(&self, id: &UserId) -> Result<bool, UserDirectoryError> {
        Ok(self.lock().users.remove(id).is_some())
    }
}
