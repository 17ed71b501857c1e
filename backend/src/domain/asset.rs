//! Lendable assets and their availability status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Identifier of an asset record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(Uuid);

impl AssetId {
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

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AssetId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Availability of an asset. An asset has exactly one status at any time.
///
/// `Borrowed` is owned by the borrow coordinator: it is set when a request is
/// approved and cleared when the request is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Available,
    Borrowed,
    InRepair,
    Unlisted,
}

impl AssetStatus {
    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Borrowed => "borrowed",
            Self::InRepair => "in_repair",
            Self::Unlisted => "unlisted",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown asset status: {0}")]
pub struct ParseAssetStatusError(pub String);

impl FromStr for AssetStatus {
    type Err = ParseAssetStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "borrowed" => Ok(Self::Borrowed),
            "in_repair" => Ok(Self::InRepair),
            "unlisted" => Ok(Self::Unlisted),
            other => Err(ParseAssetStatusError(other.to_owned())),
        }
    }
}

/// Descriptive fields an owner supplies when registering or replacing an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDraft {
    pub item_name: String,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub current_location: Option<String>,
    pub images: Vec<String>,
    pub condition_description: Option<String>,
    pub favorite: bool,
}

/// A physical item a user owns and may lend out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: AssetId,
    pub owner_user_id: UserId,
    pub item_name: String,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub current_location: Option<String>,
    pub images: Vec<String>,
    pub condition_description: Option<String>,
    pub favorite: bool,
    pub status: AssetStatus,
}

impl Asset {
    /// Build a newly registered asset, which always starts out `Available`.
    pub fn register(id: AssetId, owner_user_id: UserId, draft: AssetDraft) -> Self {
        let AssetDraft {
            item_name,
            brand_name,
            category,
            current_location,
            images,
            condition_description,
            favorite,
        } = draft;
        Self {
            id,
            owner_user_id,
            item_name,
            brand_name,
            category,
            current_location,
            images,
            condition_description,
            favorite,
            status: AssetStatus::Available,
        }
    }

    /// Whether `user` owns this asset.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_user_id == user
    }
}
