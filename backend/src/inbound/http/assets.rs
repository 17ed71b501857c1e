//! Asset catalogue HTTP handlers.
//!
//! ```text
//! GET    /api/v1/assets
//! POST   /api/v1/assets
//! GET    /api/v1/assets/{id}
//! PUT    /api/v1/assets/{id}
//! PATCH  /api/v1/assets/{id}/status
//! DELETE /api/v1/assets/{id}
//! POST   /api/v1/assets/{id}/reconcile
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Asset, AssetDraft, AssetId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_asset_status, parse_uuid};

/// Descriptive asset fields supplied on create and replace.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBody {
    pub item_name: String,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub current_location: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub condition_description: Option<String>,
    #[serde(default)]
    pub favorite: bool,
}

impl From<AssetBody> for AssetDraft {
    fn from(body: AssetBody) -> Self {
        Self {
            item_name: body.item_name,
            brand_name: body.brand_name,
            category: body.category,
            current_location: body.current_location,
            images: body.images,
            condition_description: body.condition_description,
            favorite: body.favorite,
        }
    }
}

/// Owner-requested status change.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetStatusBody {
    pub status: String,
}

fn parse_asset_id(raw: &str) -> Result<AssetId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(AssetId::from_uuid)
}

/// Assets owned by the caller.
#[get("/assets")]
pub async fn list_assets(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<Asset>>> {
    let assets = state.asset_queries.list_for_owner(user.into_inner()).await?;
    Ok(web::Json(assets))
}

/// Register a new asset owned by the caller.
#[post("/assets")]
pub async fn create_asset(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<AssetBody>,
) -> ApiResult<HttpResponse> {
    let asset = state
        .asset_commands
        .register(user.into_inner(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/v1/assets/{}", asset.id)))
        .json(asset))
}

#[get("/assets/{id}")]
pub async fn get_asset(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Asset>> {
    let id = parse_asset_id(&path.into_inner())?;
    Ok(web::Json(state.asset_queries.get(id).await?))
}

/// Replace the descriptive fields of an asset. Owner and status are kept.
#[put("/assets/{id}")]
pub async fn replace_asset(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<AssetBody>,
) -> ApiResult<web::Json<Asset>> {
    let id = parse_asset_id(&path.into_inner())?;
    let asset = state
        .asset_commands
        .replace(id, user.into_inner(), payload.into_inner().into())
        .await?;
    Ok(web::Json(asset))
}

#[patch("/assets/{id}/status")]
pub async fn set_asset_status(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<AssetStatusBody>,
) -> ApiResult<web::Json<Asset>> {
    let id = parse_asset_id(&path.into_inner())?;
    let status = parse_asset_status(&payload.status, FieldName::new("status"))?;
    let asset = state
        .asset_commands
        .set_status(id, user.into_inner(), status)
        .await?;
    Ok(web::Json(asset))
}

#[delete("/assets/{id}")]
pub async fn delete_asset(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_asset_id(&path.into_inner())?;
    state.asset_commands.delete(id, user.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Repair an asset status left inconsistent with its borrow requests.
#[post("/assets/{id}/reconcile")]
pub async fn reconcile_asset(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Asset>> {
    let id = parse_asset_id(&path.into_inner())?;
    let asset = state
        .borrow_commands
        .reconcile_asset(id, user.into_inner())
        .await?;
    Ok(web::Json(asset))
}

#[cfg(test)]
#[path = "assets_tests.rs"]
mod tests;
