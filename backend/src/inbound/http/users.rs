//! Identity provider webhook.
//!
//! ```text
//! POST /api/v1/webhooks/users
//! ```
//!
//! Receives `user.created`, `user.updated` and `user.deleted` events and
//! mirrors them into the local profile store. The caller authenticates with
//! the service API key alone; payload signatures are checked upstream.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::UserEvent;
use crate::domain::{Error, UserSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::ServiceCaller;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_id, unsupported_event};

/// Envelope of an identity provider event.
#[derive(Debug, Deserialize, Serialize)]
pub struct UserEventBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: UserEventData,
}

/// Profile payload; only `id` is present on deletions.
#[derive(Debug, Deserialize, Serialize)]
pub struct UserEventData {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    #[serde(alias = "profile_image_url")]
    pub image_url: Option<String>,
}

impl TryFrom<UserEventBody> for UserEvent {
    type Error = Error;

    fn try_from(body: UserEventBody) -> Result<Self, Self::Error> {
        let UserEventBody { kind, data } = body;
        let id = parse_user_id(&data.id, FieldName::new("data.id"))?;
        match kind.as_str() {
            "user.created" | "user.updated" => Ok(Self::Upserted(UserSummary {
                id,
                first_name: data.first_name,
                last_name: data.last_name,
                username: data.username,
                image_url: data.image_url,
            })),
            "user.deleted" => Ok(Self::Deleted(id)),
            other => Err(unsupported_event(other, FieldName::new("type"))),
        }
    }
}

/// Apply one identity provider event.
#[post("/webhooks/users")]
pub async fn user_webhook(
    state: web::Data<HttpState>,
    _caller: ServiceCaller,
    payload: web::Json<UserEventBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    debug!(kind = %body.kind, "user event received");
    let event = UserEvent::try_from(body)?;
    state.user_sync.apply(event).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::UserId;
    use crate::inbound::http::auth::API_KEY_HEADER;
    use crate::inbound::http::configure_api;
    use crate::inbound::http::test_utils::{TEST_API_KEY, add_user, lending_state};
    use crate::test_support::InMemoryLending;

    async fn post_event(store: &Arc<InMemoryLending>, key: &str, body: Value) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(lending_state(Arc::clone(store))))
                .service(web::scope("/api/v1").configure(configure_api)),
        )
        .await;
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/webhooks/users")
            .insert_header((API_KEY_HEADER, key))
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let status = response.status();
        let bytes = actix_test::read_body(response).await;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn user_id(raw: &str) -> UserId {
        UserId::new(raw).expect("valid id")
    }

    #[rstest]
    #[case("user.created")]
    #[case("user.updated")]
    #[actix_web::test]
    async fn created_and_updated_users_are_stored(#[case] kind: &str) {
        let store = Arc::new(InMemoryLending::new());
        add_user(&store, "user_nia");

        let (status, _) = post_event(
            &store,
            TEST_API_KEY,
            json!({
                "type": kind,
                "data": {
                    "id": "user_nia",
                    "first_name": "Nia",
                    "last_name": "Okafor",
                    "profile_image_url": "https://img.example/nia.png"
                }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        let stored = store.user(&user_id("user_nia")).expect("profile stored");
        assert_eq!(stored.first_name.as_deref(), Some("Nia"));
        assert_eq!(stored.last_name.as_deref(), Some("Okafor"));
        assert_eq!(stored.username, None);
        assert_eq!(stored.image_url.as_deref(), Some("https://img.example/nia.png"));
    }

    #[actix_web::test]
    async fn deleted_users_are_removed() {
        let store = Arc::new(InMemoryLending::new());
        let id = add_user(&store, "user_nia");

        let (status, _) = post_event(
            &store,
            TEST_API_KEY,
            json!({"type": "user.deleted", "data": {"id": "user_nia"}}),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(store.user(&id), None);
    }

    #[actix_web::test]
    async fn unsupported_events_are_bad_requests() {
        let store = Arc::new(InMemoryLending::new());

        let (status, body) = post_event(
            &store,
            TEST_API_KEY,
            json!({"type": "session.created", "data": {"id": "user_nia"}}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["code"], "unsupported_event");
        assert_eq!(store.user(&user_id("user_nia")), None);
    }

    #[actix_web::test]
    async fn the_api_key_is_required() {
        let store = Arc::new(InMemoryLending::new());

        let (status, _) = post_event(
            &store,
            "wrong-key",
            json!({"type": "user.created", "data": {"id": "user_nia"}}),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(store.user(&user_id("user_nia")), None);
    }
}
