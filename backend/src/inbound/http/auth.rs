//! Caller identity for HTTP handlers.
//!
//! Requests carry a shared service key in `X-Api-Key` and the acting user in
//! `X-User-Id`. The [`AuthenticatedUser`] extractor checks both before a
//! handler runs, and the user must have been synchronised from the identity
//! provider. [`ServiceCaller`] checks the key alone. Any failure is
//! `401 Unauthorized`.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::domain::{Error, UserId};

use super::state::HttpState;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const USER_ID_HEADER: &str = "x-user-id";

/// SHA-256 digest of the configured API key.
///
/// Only the digest is retained; comparisons touch every byte regardless of
/// where the first mismatch occurs.
#[derive(Clone)]
pub struct ApiKeyDigest([u8; 32]);

impl ApiKeyDigest {
    /// Digest the configured key.
    pub fn new(key: &str) -> Self {
        Self(Sha256::digest(key.as_bytes()).into())
    }

    /// Check a presented key against the configured one.
    pub fn matches(&self, presented: &str) -> bool {
        let mut candidate: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
        let difference = self
            .0
            .iter()
            .zip(candidate.iter())
            .fold(0_u8, |acc, (left, right)| acc | (left ^ right));
        candidate.zeroize();
        difference == 0
    }
}

impl std::fmt::Debug for ApiKeyDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKeyDigest(..)")
    }
}

impl Drop for ApiKeyDigest {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// The user on whose behalf a request acts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// Identifier of the acting user.
    pub fn id(&self) -> &UserId {
        &self.0
    }

    /// Consume the wrapper, yielding the user id.
    pub fn into_inner(self) -> UserId {
        self.0
    }
}

fn header<'r>(req: &'r HttpRequest, name: &str) -> Option<&'r str> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn unauthorized() -> Error {
    Error::unauthorized("missing or invalid credentials")
}

/// Handler state, provided the request presents the service API key.
fn keyed_state(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    if header(req, API_KEY_HEADER).is_some_and(|key| state.api_key.matches(key)) {
        Ok(state)
    } else {
        debug!("rejected request with missing or wrong API key");
        Err(unauthorized())
    }
}

/// A caller holding the service API key, not acting for any user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceCaller;

impl FromRequest for ServiceCaller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(keyed_state(req).map(|_| Self))
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = match keyed_state(req) {
            Ok(state) => state,
            Err(err) => return Box::pin(ready(Err(err))),
        };
        let user_id = header(req, USER_ID_HEADER).map(UserId::new);

        Box::pin(async move {
            let user_id = match user_id {
                Some(Ok(id)) => id,
                Some(Err(err)) => {
                    debug!(error = %err, "rejected malformed user id");
                    return Err(unauthorized());
                }
                None => return Err(unauthorized()),
            };

            let known = state
                .users
                .find_many_by_ids(std::slice::from_ref(&user_id))
                .await
                .map_err(|err| {
                    warn!(error = %err, "user directory lookup failed during authentication");
                    Error::service_unavailable("user directory unavailable")
                })?;
            if !known.contains_key(&user_id) {
                debug!(user_id = %user_id, "rejected unknown user");
                return Err(unauthorized());
            }
            Ok(Self(user_id))
        })
    }
}
