//! Borrow requests and their approval workflow.
//!
//! A request moves `Pending → Approved | Denied` on the owner's decision and
//! `Approved → Returned` on completion. `Denied`, `Returned` and `Cancelled`
//! are terminal. `Cancelled` is reserved; no operation produces it yet.
//!
//! The transition helpers on [`BorrowRequest`] return the targeted field
//! update to persist, or `None` when the request is not in the state the
//! transition starts from. Callers treat `None` as "nothing to do" and hand
//! back the request unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Asset, AssetId, AssetStatus, UserId, UserSummary};

/// Placeholder item name for summaries whose asset no longer exists.
pub const UNAVAILABLE_ASSET_NAME: &str = "Asset unavailable";

/// Identifier of a borrow request record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BorrowRequestId(Uuid);

impl BorrowRequestId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for BorrowRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for BorrowRequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lifecycle state of a borrow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorrowRequestStatus {
    Pending,
    Approved,
    Denied,
    Returned,
    /// Reserved for borrower-initiated cancellation.
    Cancelled,
}

impl BorrowRequestStatus {
    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Returned => "returned",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal states never transition further.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Denied | Self::Returned | Self::Cancelled)
    }
}

impl fmt::Display for BorrowRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored request status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown borrow request status: {0}")]
pub struct ParseBorrowRequestStatusError(pub String);

impl FromStr for BorrowRequestStatus {
    type Err = ParseBorrowRequestStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            "returned" => Ok(Self::Returned),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseBorrowRequestStatusError(other.to_owned())),
        }
    }
}

/// Input for opening a new borrow request.
///
/// `owner_user_id` is a snapshot of the asset's owner at creation time. It is
/// not refreshed if ownership of the asset later changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowRequestDraft {
    pub id: BorrowRequestId,
    pub asset_id: AssetId,
    pub owner_user_id: UserId,
    pub borrower_user_id: UserId,
    pub message: Option<String>,
    pub requested_from: Option<DateTime<Utc>>,
    pub requested_until: Option<DateTime<Utc>>,
}

/// A borrower's request to borrow an owner's asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub id: BorrowRequestId,
    pub asset_id: AssetId,
    pub owner_user_id: UserId,
    pub borrower_user_id: UserId,
    pub status: BorrowRequestStatus,
    pub requested_at: DateTime<Utc>,
    pub requested_from: Option<DateTime<Utc>>,
    pub requested_until: Option<DateTime<Utc>>,
    pub message: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub owner_note: Option<String>,
}

impl BorrowRequest {
    /// Open a new request in the `Pending` state.
    pub fn open(draft: BorrowRequestDraft, requested_at: DateTime<Utc>) -> Self {
        let BorrowRequestDraft {
            id,
            asset_id,
            owner_user_id,
            borrower_user_id,
            message,
            requested_from,
            requested_until,
        } = draft;
        Self {
            id,
            asset_id,
            owner_user_id,
            borrower_user_id,
            status: BorrowRequestStatus::Pending,
            requested_at,
            requested_from,
            requested_until,
            message,
            reviewed_at: None,
            due_at: None,
            returned_at: None,
            owner_note: None,
        }
    }

    /// Whether `user` holds decision authority over this request.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_user_id == user
    }

    /// Whether `user` may read this request.
    pub fn is_visible_to(&self, user: &UserId) -> bool {
        self.is_owned_by(user) || &self.borrower_user_id == user
    }

    /// Field update recording the owner's decision, if the request is pending.
    ///
    /// The due date is only kept when approving.
    pub fn decide(
        &self,
        approve: bool,
        decided_at: DateTime<Utc>,
        note: Option<String>,
        due_at: Option<DateTime<Utc>>,
    ) -> Option<BorrowRequestUpdate> {
        if self.status != BorrowRequestStatus::Pending {
            return None;
        }
        let (status, due_at) = if approve {
            (BorrowRequestStatus::Approved, due_at)
        } else {
            (BorrowRequestStatus::Denied, None)
        };
        Some(BorrowRequestUpdate {
            status,
            reviewed_at: Some(decided_at),
            owner_note: note,
            due_at,
            returned_at: None,
        })
    }

    /// Field update marking the asset as returned, if the request is approved.
    pub fn complete(
        &self,
        returned_at: DateTime<Utc>,
        note: Option<String>,
    ) -> Option<BorrowRequestUpdate> {
        if self.status != BorrowRequestStatus::Approved {
            return None;
        }
        Some(BorrowRequestUpdate {
            status: BorrowRequestStatus::Returned,
            reviewed_at: None,
            owner_note: note,
            due_at: None,
            returned_at: Some(returned_at),
        })
    }

    /// Apply a targeted update in memory. `None` fields keep their value.
    pub fn apply(&mut self, update: &BorrowRequestUpdate) {
        self.status = update.status;
        if let Some(reviewed_at) = update.reviewed_at {
            self.reviewed_at = Some(reviewed_at);
        }
        if let Some(note) = &update.owner_note {
            self.owner_note = Some(note.clone());
        }
        if let Some(due_at) = update.due_at {
            self.due_at = Some(due_at);
        }
        if let Some(returned_at) = update.returned_at {
            self.returned_at = Some(returned_at);
        }
    }
}

/// Targeted write of the mutable request fields.
///
/// Only `status` is always written; the optional fields are written when
/// present and left untouched otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowRequestUpdate {
    pub status: BorrowRequestStatus,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub owner_note: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
}

/// Asset status change written together with a request update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetTransition {
    /// Mark the asset `Borrowed`; only applies while it is `Available`.
    Lend(AssetId),
    /// Mark the asset `Available` again, whatever its current status.
    Release(AssetId),
}

impl AssetTransition {
    /// Asset targeted by the transition.
    pub const fn asset_id(self) -> AssetId {
        match self {
            Self::Lend(id) | Self::Release(id) => id,
        }
    }

    /// Status the asset ends up in.
    pub const fn target_status(self) -> AssetStatus {
        match self {
            Self::Lend(_) => AssetStatus::Borrowed,
            Self::Release(_) => AssetStatus::Available,
        }
    }
}

/// Result of a status-guarded request write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Both writes were applied.
    Applied,
    /// The request no longer had the expected status; nothing was written.
    StaleRequest,
    /// The asset could not be lent (missing or not `Available`); nothing was
    /// written.
    AssetUnavailable,
}

/// Asset snapshot shown next to a borrow request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowAssetSummary {
    pub id: AssetId,
    pub item_name: String,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub current_location: Option<String>,
    pub images: Vec<String>,
    pub status: AssetStatus,
}

impl BorrowAssetSummary {
    /// Placeholder for an asset that has been deleted.
    pub fn unavailable(id: AssetId) -> Self {
        Self {
            id,
            item_name: UNAVAILABLE_ASSET_NAME.to_owned(),
            brand_name: None,
            category: None,
            current_location: None,
            images: Vec::new(),
            status: AssetStatus::Unlisted,
        }
    }
}

impl From<&Asset> for BorrowAssetSummary {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id,
            item_name: asset.item_name.clone(),
            brand_name: asset.brand_name.clone(),
            category: asset.category.clone(),
            current_location: asset.current_location.clone(),
            images: asset.images.clone(),
            status: asset.status,
        }
    }
}

/// Borrow request decorated with its asset and the other party's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequestSummary {
    #[serde(flatten)]
    pub request: BorrowRequest,
    pub asset: BorrowAssetSummary,
    pub counterparty: UserSummary,
}

#[cfg(test)]
#[path = "borrow_request_tests.rs"]
mod tests;
