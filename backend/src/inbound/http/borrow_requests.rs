//! Borrow request HTTP handlers.
//!
//! ```text
//! POST  /api/v1/borrow-requests
//! GET   /api/v1/borrow-requests/borrower
//! GET   /api/v1/borrow-requests/owner
//! GET   /api/v1/borrow-requests/{id}
//! PATCH /api/v1/borrow-requests/{id}/decision
//! PATCH /api/v1/borrow-requests/{id}/complete
//! ```
//!
//! The list routes must be registered before `{id}` so that `borrower` and
//! `owner` are not parsed as request ids.

use actix_web::http::header;
use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{CompleteBorrowRequest, CreateBorrowRequest, DecideBorrowRequest};
use crate::domain::{AssetId, BorrowRequest, BorrowRequestId, BorrowRequestSummary, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, MESSAGE_MAX_CHARS, NOTE_MAX_CHARS, ensure_max_chars,
    parse_optional_json_body, parse_optional_rfc3339_timestamp, parse_uuid,
};

/// Request payload for opening a borrow request.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBorrowRequestBody {
    pub asset_id: String,
    pub message: Option<String>,
    pub requested_from: Option<String>,
    pub requested_until: Option<String>,
}

/// Request payload for an owner's approve or deny decision.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionBody {
    pub approve: bool,
    pub note: Option<String>,
    pub due_at: Option<String>,
}

/// Request payload for marking a loan returned.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBody {
    pub note: Option<String>,
}

fn parse_request_id(raw: &str) -> Result<BorrowRequestId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(BorrowRequestId::from_uuid)
}

fn parse_create(
    body: CreateBorrowRequestBody,
    user: AuthenticatedUser,
) -> ApiResult<CreateBorrowRequest> {
    ensure_max_chars(
        body.message.as_deref(),
        MESSAGE_MAX_CHARS,
        FieldName::new("message"),
    )?;
    Ok(CreateBorrowRequest {
        asset_id: AssetId::from_uuid(parse_uuid(&body.asset_id, FieldName::new("assetId"))?),
        borrower: user.into_inner(),
        message: body.message,
        requested_from: parse_optional_rfc3339_timestamp(
            body.requested_from.as_deref(),
            FieldName::new("requestedFrom"),
        )?,
        requested_until: parse_optional_rfc3339_timestamp(
            body.requested_until.as_deref(),
            FieldName::new("requestedUntil"),
        )?,
    })
}

/// Open a borrow request for an asset owned by someone else.
#[post("/borrow-requests")]
pub async fn create_borrow_request(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateBorrowRequestBody>,
) -> ApiResult<HttpResponse> {
    let command = parse_create(payload.into_inner(), user)?;
    let request = state.borrow_commands.create_request(command).await?;
    Ok(HttpResponse::Created()
        .insert_header((
            header::LOCATION,
            format!("/api/v1/borrow-requests/{}", request.id),
        ))
        .json(request))
}

/// Requests the caller has made, newest first.
#[get("/borrow-requests/borrower")]
pub async fn list_borrower_requests(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<BorrowRequestSummary>>> {
    let summaries = state
        .borrow_queries
        .list_for_borrower(user.into_inner())
        .await?;
    Ok(web::Json(summaries))
}

/// Requests made against the caller's assets, newest first.
#[get("/borrow-requests/owner")]
pub async fn list_owner_requests(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<BorrowRequestSummary>>> {
    let summaries = state
        .borrow_queries
        .list_for_owner(user.into_inner())
        .await?;
    Ok(web::Json(summaries))
}

/// Fetch one request. Only its owner and borrower may see it.
#[get("/borrow-requests/{id}")]
pub async fn get_borrow_request(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<BorrowRequest>> {
    let id = parse_request_id(&path.into_inner())?;
    let request = state.borrow_queries.get_request(id).await?;
    if !request.is_visible_to(user.id()) {
        debug!(request_id = %id, user_id = %user.id(), "borrow request hidden from caller");
        return Err(Error::forbidden("only the owner or borrower can view this request"));
    }
    Ok(web::Json(request))
}

/// Approve or deny a pending request.
#[patch("/borrow-requests/{id}/decision")]
pub async fn decide_borrow_request(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<DecisionBody>,
) -> ApiResult<web::Json<BorrowRequest>> {
    let request_id = parse_request_id(&path.into_inner())?;
    let DecisionBody {
        approve,
        note,
        due_at,
    } = payload.into_inner();
    ensure_max_chars(note.as_deref(), NOTE_MAX_CHARS, FieldName::new("note"))?;
    let due_at = parse_optional_rfc3339_timestamp(due_at.as_deref(), FieldName::new("dueAt"))?;

    let request = state
        .borrow_commands
        .decide(DecideBorrowRequest {
            request_id,
            acting_user: user.into_inner(),
            approve,
            note,
            due_at,
        })
        .await?;
    Ok(web::Json(request))
}

/// Record that an approved loan has been returned. The body may be empty, but
/// a body that is present must parse.
#[patch("/borrow-requests/{id}/complete")]
pub async fn complete_borrow_request(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Bytes,
) -> ApiResult<web::Json<BorrowRequest>> {
    let request_id = parse_request_id(&path.into_inner())?;
    let CompleteBody { note } = parse_optional_json_body(&payload)?;
    ensure_max_chars(note.as_deref(), NOTE_MAX_CHARS, FieldName::new("note"))?;

    let request = state
        .borrow_commands
        .complete(CompleteBorrowRequest {
            request_id,
            acting_user: user.into_inner(),
            note,
        })
        .await?;
    Ok(web::Json(request))
}

#[cfg(test)]
#[path = "borrow_requests_tests.rs"]
mod tests;
