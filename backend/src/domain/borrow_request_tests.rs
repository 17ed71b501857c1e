//! Tests for borrow request transitions.

use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};

use super::*;

fn user(id: &str) -> UserId {
    UserId::new(id).expect("fixture ids are valid")
}

#[fixture]
fn opened_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

#[fixture]
fn pending(opened_at: DateTime<Utc>) -> BorrowRequest {
    BorrowRequest::open(
        BorrowRequestDraft {
            id: BorrowRequestId::random(),
            asset_id: AssetId::random(),
            owner_user_id: user("owner"),
            borrower_user_id: user("borrower"),
            message: Some("Need it for the weekend".to_owned()),
            requested_from: None,
            requested_until: None,
        },
        opened_at,
    )
}

fn with_status(mut request: BorrowRequest, status: BorrowRequestStatus) -> BorrowRequest {
    request.status = status;
    request
}

#[rstest]
fn open_starts_pending(pending: BorrowRequest, opened_at: DateTime<Utc>) {
    assert_eq!(pending.status, BorrowRequestStatus::Pending);
    assert_eq!(pending.requested_at, opened_at);
    assert!(pending.reviewed_at.is_none());
}

#[rstest]
fn approving_keeps_due_date(pending: BorrowRequest, opened_at: DateTime<Utc>) {
    let due = opened_at + Duration::days(7);
    let update = pending
        .decide(true, opened_at, Some("ok".to_owned()), Some(due))
        .expect("pending requests can be decided");

    assert_eq!(update.status, BorrowRequestStatus::Approved);
    assert_eq!(update.reviewed_at, Some(opened_at));
    assert_eq!(update.due_at, Some(due));
    assert_eq!(update.owner_note.as_deref(), Some("ok"));
}

#[rstest]
fn denying_drops_due_date(pending: BorrowRequest, opened_at: DateTime<Utc>) {
    let update = pending
        .decide(false, opened_at, None, Some(opened_at + Duration::days(3)))
        .expect("pending requests can be decided");

    assert_eq!(update.status, BorrowRequestStatus::Denied);
    assert!(update.due_at.is_none());
}

#[rstest]
#[case(BorrowRequestStatus::Approved)]
#[case(BorrowRequestStatus::Denied)]
#[case(BorrowRequestStatus::Returned)]
#[case(BorrowRequestStatus::Cancelled)]
fn decide_is_a_no_op_outside_pending(
    pending: BorrowRequest,
    opened_at: DateTime<Utc>,
    #[case] status: BorrowRequestStatus,
) {
    let request = with_status(pending, status);
    assert!(request.decide(true, opened_at, None, None).is_none());
}

#[rstest]
#[case(BorrowRequestStatus::Pending)]
#[case(BorrowRequestStatus::Denied)]
#[case(BorrowRequestStatus::Returned)]
fn complete_requires_approval(
    pending: BorrowRequest,
    opened_at: DateTime<Utc>,
    #[case] status: BorrowRequestStatus,
) {
    let request = with_status(pending, status);
    assert!(request.complete(opened_at, None).is_none());
}

#[rstest]
fn apply_keeps_fields_the_update_leaves_out(pending: BorrowRequest, opened_at: DateTime<Utc>) {
    let due = opened_at + Duration::days(7);
    let mut request = pending;
    let approval = request
        .decide(true, opened_at, Some("take care".to_owned()), Some(due))
        .expect("pending requests can be decided");
    request.apply(&approval);

    let returned_at = opened_at + Duration::days(5);
    let completion = request
        .complete(returned_at, None)
        .expect("approved requests can be completed");
    request.apply(&completion);

    assert_eq!(request.status, BorrowRequestStatus::Returned);
    assert_eq!(request.reviewed_at, Some(opened_at));
    assert_eq!(request.due_at, Some(due));
    assert_eq!(request.returned_at, Some(returned_at));
    assert_eq!(request.owner_note.as_deref(), Some("take care"));
}

#[rstest]
fn visibility_covers_owner_and_borrower(pending: BorrowRequest) {
    assert!(pending.is_visible_to(&user("owner")));
    assert!(pending.is_visible_to(&user("borrower")));
    assert!(!pending.is_visible_to(&user("stranger")));
    assert!(!pending.is_owned_by(&user("borrower")));
}

#[rstest]
#[case(BorrowRequestStatus::Pending, false)]
#[case(BorrowRequestStatus::Approved, false)]
#[case(BorrowRequestStatus::Denied, true)]
#[case(BorrowRequestStatus::Returned, true)]
#[case(BorrowRequestStatus::Cancelled, true)]
fn terminal_states(#[case] status: BorrowRequestStatus, #[case] terminal: bool) {
    assert_eq!(status.is_terminal(), terminal);
    assert_eq!(status.as_str().parse::<BorrowRequestStatus>(), Ok(status));
}

#[rstest]
fn unavailable_asset_placeholder() {
    let id = AssetId::random();
    let summary = BorrowAssetSummary::unavailable(id);
    assert_eq!(summary.id, id);
    assert_eq!(summary.item_name, UNAVAILABLE_ASSET_NAME);
    assert_eq!(summary.status, AssetStatus::Unlisted);
    assert!(summary.images.is_empty());
    assert!(summary.brand_name.is_none() && summary.category.is_none());
    assert!(summary.current_location.is_none());
}

#[rstest]
fn summary_flattens_request_fields(pending: BorrowRequest) {
    let summary = BorrowRequestSummary {
        asset: BorrowAssetSummary::unavailable(pending.asset_id),
        counterparty: UserSummary::unknown(pending.owner_user_id.clone()),
        request: pending.clone(),
    };

    let value = serde_json::to_value(&summary).expect("serialise summary");

    assert_eq!(value["id"], serde_json::json!(pending.id.to_string()));
    assert_eq!(value["status"], serde_json::json!("pending"));
    assert_eq!(value["asset"]["itemName"], serde_json::json!(UNAVAILABLE_ASSET_NAME));
    assert_eq!(value["counterparty"]["username"], serde_json::json!("Unknown user"));
}
