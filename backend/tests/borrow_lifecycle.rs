//! Lending coordinator behaviour against the in-memory stores that the
//! narrative scenarios in `features/borrow_lifecycle.feature` do not cover:
//! races, listings and the self-borrow rule across every asset status.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::{fixture, rstest};

use hippo_backend::domain::ports::{
    BorrowCommand, BorrowQuery, CreateBorrowRequest, DecideBorrowRequest,
};
use hippo_backend::domain::{
    Asset, AssetDraft, AssetId, AssetStatus, BorrowRequest, BorrowRequestStatus, BorrowService,
    ErrorCode, UNAVAILABLE_ASSET_NAME, UserId, UserSummary,
};
use hippo_backend::test_support::{FixedClock, InMemoryLending};

type Service = BorrowService<InMemoryLending, InMemoryLending, InMemoryLending>;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn user(id: &str) -> UserId {
    UserId::new(id).expect("valid user id")
}

struct Lending {
    store: Arc<InMemoryLending>,
    service: Service,
    asset: AssetId,
}

impl Lending {
    fn with_clock(store: Arc<InMemoryLending>, at: DateTime<Utc>) -> Service {
        BorrowService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            store,
            Arc::new(FixedClock(at)),
        )
    }

    fn asset_status(&self) -> Option<AssetStatus> {
        self.store.asset(&self.asset).map(|asset| asset.status)
    }

    async fn create(&self, borrower: &str) -> Result<BorrowRequest, hippo_backend::domain::Error> {
        self.service
            .create_request(CreateBorrowRequest {
                asset_id: self.asset,
                borrower: user(borrower),
                message: Some("May I borrow it?".to_owned()),
                requested_from: None,
                requested_until: None,
            })
            .await
    }

    async fn decide(
        &self,
        request: &BorrowRequest,
        acting: &str,
        approve: bool,
    ) -> Result<BorrowRequest, hippo_backend::domain::Error> {
        self.service
            .decide(DecideBorrowRequest {
                request_id: request.id,
                acting_user: user(acting),
                approve,
                note: None,
                due_at: Some(now() + Duration::days(7)),
            })
            .await
    }
}

fn seeded_store(asset_status: AssetStatus) -> (Arc<InMemoryLending>, AssetId) {
    let store = Arc::new(InMemoryLending::new());
    for id in ["u1", "u2", "u3"] {
        store.add_user(UserSummary {
            username: Some(id.to_owned()),
            ..UserSummary::unknown(user(id))
        });
    }
    let mut asset = Asset::register(
        AssetId::random(),
        user("u1"),
        AssetDraft {
            item_name: "Pressure washer".to_owned(),
            ..AssetDraft::default()
        },
    );
    asset.status = asset_status;
    let id = asset.id;
    store.put_asset(asset);
    (store, id)
}

#[fixture]
fn lending() -> Lending {
    let (store, asset) = seeded_store(AssetStatus::Available);
    Lending {
        service: Lending::with_clock(Arc::clone(&store), now()),
        store,
        asset,
    }
}

#[rstest]
#[case(AssetStatus::Available)]
#[case(AssetStatus::Borrowed)]
#[case(AssetStatus::InRepair)]
#[case(AssetStatus::Unlisted)]
#[tokio::test]
async fn owners_cannot_borrow_their_own_assets(#[case] status: AssetStatus) {
    let (store, asset) = seeded_store(status);
    let lending = Lending {
        service: Lending::with_clock(Arc::clone(&store), now()),
        store,
        asset,
    };

    let error = lending.create("u1").await.expect_err("self borrow");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("rule details");
    assert_eq!(details["code"], "self_borrow");
}

#[rstest]
#[tokio::test]
async fn competing_approvals_lend_the_asset_once(lending: Lending) {
    let first = lending.create("u2").await.expect("first request");
    let second = lending.create("u3").await.expect("second request");

    let (left, right) = tokio::join!(
        lending.decide(&first, "u1", true),
        lending.decide(&second, "u1", true)
    );

    let approvals = [left, right]
        .into_iter()
        .filter(|result| {
            result
                .as_ref()
                .is_ok_and(|request| request.status == BorrowRequestStatus::Approved)
        })
        .count();
    assert_eq!(approvals, 1);
    assert_eq!(lending.asset_status(), Some(AssetStatus::Borrowed));
}

#[rstest]
#[tokio::test]
async fn owner_listing_is_newest_first_and_tolerates_deleted_assets() {
    let (store, asset) = seeded_store(AssetStatus::Available);
    let earlier = Lending {
        service: Lending::with_clock(Arc::clone(&store), now()),
        store: Arc::clone(&store),
        asset,
    };
    let later = Lending {
        service: Lending::with_clock(Arc::clone(&store), now() + Duration::hours(1)),
        store: Arc::clone(&store),
        asset,
    };
    let first = earlier.create("u2").await.expect("first request");
    let second = later.create("u3").await.expect("second request");
    store.remove_asset(&asset);

    let summaries = earlier
        .service
        .list_for_owner(user("u1"))
        .await
        .expect("listing succeeds");

    let ids: Vec<_> = summaries.iter().map(|summary| summary.request.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    for summary in &summaries {
        assert_eq!(summary.asset.id, asset);
        assert_eq!(summary.asset.item_name, UNAVAILABLE_ASSET_NAME);
        assert_eq!(summary.asset.status, AssetStatus::Unlisted);
    }
    assert_eq!(summaries[0].counterparty.username.as_deref(), Some("u3"));
}
