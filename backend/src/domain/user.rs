//! User aggregate and its validated field types.
//!
//! A user owns posts, reacts to posts, and keeps a reading list. The
//! aggregate carries denormalized totals over its posts' counters; those
//! totals are maintained by paired writes (see the engagement and post
//! services), not by live queries.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::post::{HostedImage, PostId};

/// Maximum length of a display name in characters.
pub const DISPLAY_NAME_MAX: usize = 64;
/// Maximum length of a username in characters.
pub const USERNAME_MAX: usize = 48;

/// Validation errors returned by the field constructors in this module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Id was not a valid UUID.
    InvalidId,
    /// Display name was empty once trimmed.
    EmptyDisplayName,
    /// Display name exceeded [`DISPLAY_NAME_MAX`] characters.
    DisplayNameTooLong { max: usize },
    /// Username was empty once normalised.
    EmptyUsername,
    /// Username exceeded [`USERNAME_MAX`] characters.
    UsernameTooLong { max: usize },
    /// Username contained characters outside `a-z`, `0-9`, `.`, `_`, `-`.
    UsernameInvalidCharacters,
    /// Email address was structurally invalid.
    InvalidEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain lowercase letters, digits, dots, underscores, or dashes",
            ),
            Self::InvalidEmail => write!(f, "email address is not valid"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse and validate a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique handle a user is addressed by in profile routes.
///
/// ## Invariants
/// - lowercase, non-empty, at most [`USERNAME_MAX`] characters;
/// - characters restricted to `a-z`, `0-9`, `.`, `_`, `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Normalise (trim, lowercase) and validate a username.
    pub fn new(username: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalized = username.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if normalized.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
        {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(normalized))
    }

    /// Derive a fresh username from a display name and a registration instant.
    ///
    /// The display name is lowercased and stripped to the username alphabet;
    /// the millisecond timestamp keeps two registrations under the same name
    /// from colliding.
    pub fn generate(display_name: &DisplayName, at: DateTime<Utc>) -> Self {
        let stem: String = display_name
            .as_ref()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .take(USERNAME_MAX / 2)
            .collect();
        let stem = if stem.is_empty() { "author" } else { stem.as_str() };
        Self(format!("{stem}-{}", at.timestamp_millis()))
    }

    /// Borrow the underlying handle.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased email address used as the login identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Normalise (trim, lowercase) and validate an email address.
    ///
    /// Validation is structural only: one `@` with a non-empty local part and
    /// a dotted domain. Deliverability is the mail provider's problem.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalized = email.as_ref().trim().to_lowercase();
        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty()
            || domain.is_empty()
            || !domain.contains('.')
            || normalized.chars().any(char::is_whitespace)
        {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalized))
    }

    /// Borrow the underlying address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human readable name shown on posts and profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(display_name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = display_name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the underlying name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered account.
///
/// ## Invariants
/// - `posts_published == posts.len()`;
/// - `total_reactions` / `total_visits` equal the sums of the corresponding
///   counters over the posts in `posts`.
///
/// These hold eventually: they are maintained by paired writes against the
/// post store and this aggregate, with no cross-record transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub display_name: DisplayName,
    pub bio: Option<String>,
    pub avatar: Option<HostedImage>,
    /// Owned posts in insertion (publication) order.
    pub posts: Vec<PostId>,
    /// Posts this user has reacted to; set semantics, at most one entry each.
    pub reacted_posts: Vec<PostId>,
    /// Reading-list membership; set semantics, insertion ordered.
    pub reading_list: Vec<PostId>,
    pub posts_published: u64,
    pub total_visits: u64,
    pub total_reactions: u64,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a freshly registered account with zeroed counters.
    pub fn register(
        username: Username,
        email: Email,
        password_hash: String,
        display_name: DisplayName,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::random(),
            username,
            email,
            password_hash,
            display_name,
            bio: None,
            avatar: None,
            posts: Vec::new(),
            reacted_posts: Vec::new(),
            reading_list: Vec::new(),
            posts_published: 0,
            total_visits: 0,
            total_reactions: 0,
            created_at,
        }
    }

    /// Whether this user has already reacted to the given post.
    pub fn has_reacted_to(&self, post: &PostId) -> bool {
        self.reacted_posts.contains(post)
    }

    /// Whether the given post is on this user's reading list.
    pub fn has_saved(&self, post: &PostId) -> bool {
        self.reading_list.contains(post)
    }

    /// URL of the avatar image, if one has been uploaded.
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar.as_ref().map(|image| image.url.as_str())
    }
}
