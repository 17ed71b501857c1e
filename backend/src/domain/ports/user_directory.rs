//! Ports onto the user profiles synchronised from the identity provider.
//!
//! [`UserDirectory`] is the read side used to label listings and admit
//! callers; [`UserRegistry`] is the write side fed by identity provider
//! events.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{UserId, UserSummary};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user directory adapters.
    pub enum UserDirectoryError {
        /// Directory connection could not be established.
        Connection { message: String } =>
            "user directory connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "user directory query failed: {message}",
    }
}

/// Batch lookup of user summaries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve every known id in `ids`. Unknown ids are absent from the map.
    async fn find_many_by_ids(
        &self,
        ids: &[UserId],
    ) -> Result<HashMap<UserId, UserSummary>, UserDirectoryError>;
}

/// Write side of the user profile store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRegistry: Send + Sync {
    /// Insert a profile, or overwrite every profile field of an existing one.
    async fn upsert(&self, user: &UserSummary) -> Result<(), UserDirectoryError>;

    /// Remove a profile. Returns `false` when no such user was stored.
    async fn remove(&self, id: &UserId) -> Result<bool, UserDirectoryError>;
}
