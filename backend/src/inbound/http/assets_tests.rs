//! Tests for asset HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::{
    Asset, AssetDraft, AssetId, AssetStatus, BorrowRequest, BorrowRequestDraft, BorrowRequestId,
    BorrowRequestStatus, UserId,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::test_utils::{add_user, credentials, fixed_now, lending_state};
use crate::test_support::InMemoryLending;

async fn call(
    store: &Arc<InMemoryLending>,
    request: actix_test::TestRequest,
    user: &UserId,
) -> (StatusCode, Value) {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(lending_state(Arc::clone(store))))
            .service(web::scope("/api/v1").configure(configure_api)),
    )
    .await;
    let mut request = request;
    for header in credentials(user) {
        request = request.insert_header(header);
    }
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, json)
}

fn stored_asset(store: &InMemoryLending, owner: &UserId, status: AssetStatus) -> AssetId {
    let mut asset = Asset::register(
        AssetId::random(),
        owner.clone(),
        AssetDraft {
            item_name: "Tent".to_owned(),
            ..AssetDraft::default()
        },
    );
    asset.status = status;
    let id = asset.id;
    store.put_asset(asset);
    id
}

#[actix_web::test]
async fn create_registers_an_available_asset() {
    let store = Arc::new(InMemoryLending::new());
    let owner = add_user(&store, "olive");

    let (status, body) = call(
        &store,
        actix_test::TestRequest::post()
            .uri("/api/v1/assets")
            .set_json(json!({
                "itemName": "Tent <script>x</script>",
                "category": "camping",
                "images": ["https://img.example/tent.jpg"],
            })),
        &owner,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "available");
    assert_eq!(body["itemName"], "Tent x");
    assert_eq!(body["ownerUserId"], "olive");
    assert_eq!(body["favorite"], false);
}

#[actix_web::test]
async fn list_returns_only_the_callers_assets() {
    let store = Arc::new(InMemoryLending::new());
    let owner = add_user(&store, "olive");
    let other = add_user(&store, "bruno");
    stored_asset(&store, &owner, AssetStatus::Available);
    stored_asset(&store, &other, AssetStatus::Available);

    let (status, body) = call(
        &store,
        actix_test::TestRequest::get().uri("/api/v1/assets"),
        &owner,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let assets = body.as_array().expect("array body");
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0]["ownerUserId"], "olive");
}

#[actix_web::test]
async fn replace_keeps_status_and_is_owner_only() {
    let store = Arc::new(InMemoryLending::new());
    let owner = add_user(&store, "olive");
    let other = add_user(&store, "bruno");
    let id = stored_asset(&store, &owner, AssetStatus::InRepair);
    let replace = || {
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/assets/{id}"))
            .set_json(json!({"itemName": "Two-person tent"}))
    };

    let (forbidden, _) = call(&store, replace(), &other).await;
    let (status, body) = call(&store, replace(), &owner).await;

    assert_eq!(forbidden, StatusCode::FORBIDDEN);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["itemName"], "Two-person tent");
    assert_eq!(body["status"], "in_repair");
}

#[rstest]
#[case("unlisted", StatusCode::OK)]
#[case("borrowed", StatusCode::BAD_REQUEST)]
#[case("lost", StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn status_changes_exclude_borrowed(#[case] requested: &str, #[case] expected: StatusCode) {
    let store = Arc::new(InMemoryLending::new());
    let owner = add_user(&store, "olive");
    let id = stored_asset(&store, &owner, AssetStatus::Available);

    let (status, _) = call(
        &store,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/assets/{id}/status"))
            .set_json(json!({"status": requested})),
        &owner,
    )
    .await;

    assert_eq!(status, expected);
}

#[rstest]
#[case(AssetStatus::Available, StatusCode::NO_CONTENT)]
#[case(AssetStatus::Borrowed, StatusCode::CONFLICT)]
#[actix_web::test]
async fn delete_refuses_lent_assets(#[case] current: AssetStatus, #[case] expected: StatusCode) {
    let store = Arc::new(InMemoryLending::new());
    let owner = add_user(&store, "olive");
    let id = stored_asset(&store, &owner, current);

    let (status, _) = call(
        &store,
        actix_test::TestRequest::delete().uri(&format!("/api/v1/assets/{id}")),
        &owner,
    )
    .await;

    assert_eq!(status, expected);
    assert_eq!(store.asset(&id).is_some(), current == AssetStatus::Borrowed);
}

#[actix_web::test]
async fn get_missing_asset_is_not_found() {
    let store = Arc::new(InMemoryLending::new());
    let owner = add_user(&store, "olive");

    let (status, body) = call(
        &store,
        actix_test::TestRequest::get().uri(&format!("/api/v1/assets/{}", AssetId::random())),
        &owner,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[actix_web::test]
async fn reconcile_restores_a_drifted_status() {
    let store = Arc::new(InMemoryLending::new());
    let owner = add_user(&store, "olive");
    let borrower = add_user(&store, "bruno");
    let id = stored_asset(&store, &owner, AssetStatus::Available);
    let mut request = BorrowRequest::open(
        BorrowRequestDraft {
            id: BorrowRequestId::random(),
            asset_id: id,
            owner_user_id: owner.clone(),
            borrower_user_id: borrower,
            message: None,
            requested_from: None,
            requested_until: None,
        },
        fixed_now(),
    );
    request.status = BorrowRequestStatus::Approved;
    crate::domain::ports::BorrowRequestRepository::insert(store.as_ref(), &request)
        .await
        .expect("seed request");

    let (status, body) = call(
        &store,
        actix_test::TestRequest::post().uri(&format!("/api/v1/assets/{id}/reconcile")),
        &owner,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "borrowed");
}
