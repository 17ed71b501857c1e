//! Driving port for identity provider profile events.

use async_trait::async_trait;

use crate::domain::{Error, UserId, UserSummary};

/// A profile change reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    /// The user was created or their profile changed.
    Upserted(UserSummary),
    /// The user was removed from the identity provider.
    Deleted(UserId),
}

/// Apply identity provider events to the local profile store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserSyncCommand: Send + Sync {
    /// Apply one event. Deleting an unknown user is not an error.
    async fn apply(&self, event: UserEvent) -> Result<(), Error>;
}
