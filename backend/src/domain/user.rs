//! User identity as seen by the lending domain.
//!
//! Users are owned by an external identity provider. The lending domain holds
//! their opaque identifiers and a copy of their profile summaries, kept in
//! step by provider events and used to decorate borrow-request listings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum accepted length of an external user identifier.
pub const USER_ID_MAX: usize = 128;

/// Placeholder username used when a counterparty profile is missing.
pub const UNKNOWN_USERNAME: &str = "Unknown user";

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    IdTooLong { max: usize },
    IdContainsWhitespace,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::IdTooLong { max } => write!(f, "user id must be at most {max} characters"),
            Self::IdContainsWhitespace => write!(f, "user id must not contain whitespace"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Opaque user identifier issued by the identity provider.
///
/// Surrounding whitespace is trimmed; the remaining value must be non-empty,
/// contain no whitespace and fit within [`USER_ID_MAX`] characters.
///
/// # Examples
/// ```
/// use hippo_backend::domain::UserId;
///
/// let id = UserId::new("  user_2abc  ").expect("valid id");
/// assert_eq!(id.as_ref(), "user_2abc");
/// assert!(UserId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = id.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if trimmed.chars().count() > USER_ID_MAX {
            return Err(UserValidationError::IdTooLong { max: USER_ID_MAX });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(UserValidationError::IdContainsWhitespace);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Profile summary used to label borrow requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub image_url: Option<String>,
}

impl UserSummary {
    /// Placeholder summary for a user the directory no longer knows about.
    pub fn unknown(id: UserId) -> Self {
        Self {
            id,
            first_name: None,
            last_name: None,
            username: Some(UNKNOWN_USERNAME.to_owned()),
            image_url: None,
        }
    }
}
