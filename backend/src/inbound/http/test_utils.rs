//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{AssetService, BorrowService, UserId, UserSummary, UserSyncService};
use crate::inbound::http::auth::{API_KEY_HEADER, ApiKeyDigest, USER_ID_HEADER};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::test_support::{FixedClock, InMemoryLending};

pub const TEST_API_KEY: &str = "test-api-key";

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Build handler state backed entirely by one in-memory store.
pub fn lending_state(store: Arc<InMemoryLending>) -> HttpState {
    let borrow = Arc::new(BorrowService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(FixedClock(fixed_now())),
    ));
    let assets = Arc::new(AssetService::new(Arc::clone(&store)));
    HttpState::new(
        HttpStatePorts {
            borrow_commands: borrow.clone(),
            borrow_queries: borrow,
            asset_commands: assets.clone(),
            asset_queries: assets,
            users: Arc::clone(&store) as _,
            user_sync: Arc::new(UserSyncService::new(store)),
        },
        ApiKeyDigest::new(TEST_API_KEY),
    )
}

/// Register a user with a readable name and return its id.
pub fn add_user(store: &InMemoryLending, id: &str) -> UserId {
    let user_id = UserId::new(id).expect("valid fixture id");
    store.add_user(UserSummary {
        first_name: Some(id.to_owned()),
        ..UserSummary::unknown(user_id.clone())
    });
    user_id
}

/// Headers identifying `user` with the test API key.
pub fn credentials(user: &UserId) -> [(&'static str, String); 2] {
    [
        (API_KEY_HEADER, TEST_API_KEY.to_owned()),
        (USER_ID_HEADER, user.to_string()),
    ]
}
