//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and never
//! leave it. Conversions into domain types validate identifiers and status
//! strings and report failures as plain messages for the adapters to wrap.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Asset, AssetId, AssetStatus, BorrowRequest, BorrowRequestId, BorrowRequestStatus,
    BorrowRequestUpdate, UserId, UserSummary,
};

use super::schema::{assets, borrow_requests, users};

fn user_id(raw: String, column: &str) -> Result<UserId, String> {
    UserId::new(raw).map_err(|err| format!("invalid {column}: {err}"))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading user profiles.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub image_url: Option<String>,
}

impl TryFrom<UserRow> for UserSummary {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: user_id(row.id, "users.id")?,
            first_name: row.first_name,
            last_name: row.last_name,
            username: row.username,
            image_url: row.image_url,
        })
    }
}

/// Insert payload for a synchronised user profile.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub username: Option<&'a str>,
    pub image_url: Option<&'a str>,
}

impl<'a> From<&'a UserSummary> for NewUserRow<'a> {
    fn from(user: &'a UserSummary) -> Self {
        Self {
            id: user.id.as_ref(),
            first_name: user.first_name.as_deref(),
            last_name: user.last_name.as_deref(),
            username: user.username.as_deref(),
            image_url: user.image_url.as_deref(),
        }
    }
}

/// Profile fields overwritten when a known user is synchronised again.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserProfileChangeset<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub username: Option<&'a str>,
    pub image_url: Option<&'a str>,
}

impl<'a> From<&'a UserSummary> for UserProfileChangeset<'a> {
    fn from(user: &'a UserSummary) -> Self {
        Self {
            first_name: user.first_name.as_deref(),
            last_name: user.last_name.as_deref(),
            username: user.username.as_deref(),
            image_url: user.image_url.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// Row struct for reading and inserting assets.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = assets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssetRow {
    pub id: Uuid,
    pub owner_user_id: String,
    pub item_name: String,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub current_location: Option<String>,
    pub images: Vec<String>,
    pub condition_description: Option<String>,
    pub favorite: bool,
    pub status: String,
}

impl From<&Asset> for AssetRow {
    fn from(asset: &Asset) -> Self {
        Self {
            id: *asset.id.as_uuid(),
            owner_user_id: asset.owner_user_id.to_string(),
            item_name: asset.item_name.clone(),
            brand_name: asset.brand_name.clone(),
            category: asset.category.clone(),
            current_location: asset.current_location.clone(),
            images: asset.images.clone(),
            condition_description: asset.condition_description.clone(),
            favorite: asset.favorite,
            status: asset.status.as_str().to_owned(),
        }
    }
}

impl TryFrom<AssetRow> for Asset {
    type Error = String;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<AssetStatus>()
            .map_err(|err| err.to_string())?;
        Ok(Self {
            id: AssetId::from_uuid(row.id),
            owner_user_id: user_id(row.owner_user_id, "assets.owner_user_id")?,
            item_name: row.item_name,
            brand_name: row.brand_name,
            category: row.category,
            current_location: row.current_location,
            images: row.images,
            condition_description: row.condition_description,
            favorite: row.favorite,
            status,
        })
    }
}

/// Changeset for the descriptive asset columns. Owner and status are never
/// part of a replace.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = assets)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AssetDetailsChangeset<'a> {
    pub item_name: &'a str,
    pub brand_name: Option<&'a str>,
    pub category: Option<&'a str>,
    pub current_location: Option<&'a str>,
    pub images: &'a [String],
    pub condition_description: Option<&'a str>,
    pub favorite: bool,
}

impl<'a> From<&'a Asset> for AssetDetailsChangeset<'a> {
    fn from(asset: &'a Asset) -> Self {
        Self {
            item_name: &asset.item_name,
            brand_name: asset.brand_name.as_deref(),
            category: asset.category.as_deref(),
            current_location: asset.current_location.as_deref(),
            images: &asset.images,
            condition_description: asset.condition_description.as_deref(),
            favorite: asset.favorite,
        }
    }
}

// ---------------------------------------------------------------------------
// Borrow requests
// ---------------------------------------------------------------------------

/// Row struct for reading and inserting borrow requests.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = borrow_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BorrowRequestRow {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub owner_user_id: String,
    pub borrower_user_id: String,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub requested_from: Option<DateTime<Utc>>,
    pub requested_until: Option<DateTime<Utc>>,
    pub message: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub owner_note: Option<String>,
}

impl From<&BorrowRequest> for BorrowRequestRow {
    fn from(request: &BorrowRequest) -> Self {
        Self {
            id: *request.id.as_uuid(),
            asset_id: *request.asset_id.as_uuid(),
            owner_user_id: request.owner_user_id.to_string(),
            borrower_user_id: request.borrower_user_id.to_string(),
            status: request.status.as_str().to_owned(),
            requested_at: request.requested_at,
            requested_from: request.requested_from,
            requested_until: request.requested_until,
            message: request.message.clone(),
            reviewed_at: request.reviewed_at,
            due_at: request.due_at,
            returned_at: request.returned_at,
            owner_note: request.owner_note.clone(),
        }
    }
}

impl TryFrom<BorrowRequestRow> for BorrowRequest {
    type Error = String;

    fn try_from(row: BorrowRequestRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<BorrowRequestStatus>()
            .map_err(|err| err.to_string())?;
        Ok(Self {
            id: BorrowRequestId::from_uuid(row.id),
            asset_id: AssetId::from_uuid(row.asset_id),
            owner_user_id: user_id(row.owner_user_id, "borrow_requests.owner_user_id")?,
            borrower_user_id: user_id(row.borrower_user_id, "borrow_requests.borrower_user_id")?,
            status,
            requested_at: row.requested_at,
            requested_from: row.requested_from,
            requested_until: row.requested_until,
            message: row.message,
            reviewed_at: row.reviewed_at,
            due_at: row.due_at,
            returned_at: row.returned_at,
            owner_note: row.owner_note,
        })
    }
}

/// Targeted changeset for the mutable request columns. `None` fields are
/// skipped, leaving the stored value in place.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = borrow_requests)]
pub(crate) struct BorrowRequestChangeset<'a> {
    pub status: &'a str,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub owner_note: Option<&'a str>,
    pub due_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a BorrowRequestUpdate> for BorrowRequestChangeset<'a> {
    fn from(update: &'a BorrowRequestUpdate) -> Self {
        Self {
            status: update.status.as_str(),
            reviewed_at: update.reviewed_at,
            owner_note: update.owner_note.as_deref(),
            due_at: update.due_at,
            returned_at: update.returned_at,
        }
    }
}
