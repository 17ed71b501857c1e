//! Keeps the local user profiles in step with the identity provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::borrow_service::map_directory_error;
use crate::domain::ports::{UserEvent, UserRegistry, UserSyncCommand};
use crate::domain::sanitize::clean_text;
use crate::domain::{Error, UserSummary};

/// Service implementing [`UserSyncCommand`] over a [`UserRegistry`].
#[derive(Clone)]
pub struct UserSyncService<R> {
    registry: Arc<R>,
}

impl<R> UserSyncService<R> {
    /// Create a new service writing to `registry`.
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }
}

fn clean_profile(user: UserSummary) -> UserSummary {
    UserSummary {
        id: user.id,
        first_name: clean_text(user.first_name.as_deref()),
        last_name: clean_text(user.last_name.as_deref()),
        username: clean_text(user.username.as_deref()),
        image_url: user
            .image_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty()),
    }
}

#[async_trait]
impl<R> UserSyncCommand for UserSyncService<R>
where
    R: UserRegistry,
{
    async fn apply(&self, event: UserEvent) -> Result<(), Error> {
        match event {
            UserEvent::Upserted(user) => {
                let user = clean_profile(user);
                self.registry
                    .upsert(&user)
                    .await
                    .map_err(map_directory_error)?;
                info!(user_id = %user.id, "user profile synchronised");
            }
            UserEvent::Deleted(id) => {
                let removed = self
                    .registry
                    .remove(&id)
                    .await
                    .map_err(map_directory_error)?;
                if removed {
                    info!(user_id = %id, "user profile removed");
                } else {
                    debug!(user_id = %id, "delete for unknown user ignored");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{MockUserRegistry, UserDirectoryError};
    use crate::domain::{ErrorCode, UserId};

    fn alice() -> UserId {
        UserId::new("user_alice").expect("valid id")
    }

    #[rstest]
    #[tokio::test]
    async fn upserts_cleaned_profiles() {
        let mut registry = MockUserRegistry::new();
        registry
            .expect_upsert()
            .withf(|user| {
                user.first_name.as_deref() == Some("Alice")
                    && user.last_name.is_none()
                    && user.image_url.as_deref() == Some("https://img.example/a.png")
            })
            .times(1)
            .return_once(|_| Ok(()));
        let service = UserSyncService::new(Arc::new(registry));

        service
            .apply(UserEvent::Upserted(UserSummary {
                id: alice(),
                first_name: Some(" <b>Alice</b> ".to_owned()),
                last_name: Some("   ".to_owned()),
                username: None,
                image_url: Some(" https://img.example/a.png ".to_owned()),
            }))
            .await
            .expect("upsert succeeds");
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    #[tokio::test]
    async fn deletes_are_idempotent(#[case] stored: bool) {
        let mut registry = MockUserRegistry::new();
        registry
            .expect_remove()
            .times(1)
            .return_once(move |_| Ok(stored));
        let service = UserSyncService::new(Arc::new(registry));

        service
            .apply(UserEvent::Deleted(alice()))
            .await
            .expect("delete succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn connection_failures_are_service_unavailable() {
        let mut registry = MockUserRegistry::new();
        registry
            .expect_remove()
            .return_once(|_| Err(UserDirectoryError::connection("refused")));
        let service = UserSyncService::new(Arc::new(registry));

        let error = service
            .apply(UserEvent::Deleted(alice()))
            .await
            .expect_err("connection failure propagates");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
