//! Post aggregate: a published content unit and its engagement counters.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::user::UserId;

/// Maximum length of a post title in characters.
pub const TITLE_MAX: usize = 180;

/// Average words-per-minute used for the reading-time estimate.
const AVG_READ_WPM: usize = 200;

/// Validation errors returned by the constructors in this module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    /// Id was not a valid UUID.
    InvalidId,
    /// Title was empty once trimmed.
    EmptyTitle,
    /// Title exceeded [`TITLE_MAX`] characters.
    TitleTooLong { max: usize },
    /// Post body was empty once trimmed.
    EmptyContent,
    /// Hosted image was missing its URL or public id.
    IncompleteImage,
}

impl fmt::Display for PostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "post id must be a valid UUID"),
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::EmptyContent => write!(f, "content must not be empty"),
            Self::IncompleteImage => {
                write!(f, "hosted image needs both a URL and a public id")
            }
        }
    }
}

impl std::error::Error for PostValidationError {}

/// Stable post identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostId(Uuid);

impl PostId {
    /// Parse and validate a [`PostId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, PostValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| PostValidationError::InvalidId)
    }

    /// Generate a new random [`PostId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Post title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    /// Validate and construct a [`Title`].
    pub fn new(title: impl AsRef<str>) -> Result<Self, PostValidationError> {
        let trimmed = title.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(PostValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the underlying title.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an image kept by the external image host.
///
/// The `public_id` is the host-side handle; re-uploading under the same id
/// replaces the asset, which is how banner updates avoid leaking orphans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImage {
    pub url: String,
    pub public_id: String,
}

impl HostedImage {
    /// Validate and construct a [`HostedImage`] reference.
    pub fn new(
        url: impl Into<String>,
        public_id: impl Into<String>,
    ) -> Result<Self, PostValidationError> {
        let url = url.into();
        let public_id = public_id.into();
        if url.is_empty() || public_id.is_empty() {
            return Err(PostValidationError::IncompleteImage);
        }
        Ok(Self { url, public_id })
    }
}

/// Estimated minutes needed to read `text` at [`AVG_READ_WPM`].
pub fn reading_time_minutes(text: &str) -> u64 {
    let words = text.split_whitespace().count();
    words.div_ceil(AVG_READ_WPM) as u64
}

/// Published content unit.
///
/// ## Invariants
/// - `owner` is immutable after creation;
/// - the engagement counters never go below zero; decrements are guarded by
///   membership checks in the engagement service and saturate defensively in
///   the store adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub owner: UserId,
    pub title: Title,
    /// Raw markdown body; rendering belongs to the presentation layer.
    pub content: String,
    pub banner: HostedImage,
    pub reading_time_minutes: u64,
    pub reaction_count: u64,
    pub bookmark_count: u64,
    pub visit_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build a freshly published post with zeroed counters.
    pub fn publish(
        owner: UserId,
        title: Title,
        content: String,
        banner: HostedImage,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PostValidationError> {
        if content.trim().is_empty() {
            return Err(PostValidationError::EmptyContent);
        }
        let reading_time = reading_time_minutes(&content);
        Ok(Self {
            id: PostId::random(),
            owner,
            title,
            content,
            banner,
            reading_time_minutes: reading_time,
            reaction_count: 0,
            bookmark_count: 0,
            visit_count: 0,
            created_at,
            updated_at: created_at,
        })
    }

    /// Replace the content fields, leaving counters untouched.
    pub fn apply_edit(
        &mut self,
        title: Title,
        content: String,
        at: DateTime<Utc>,
    ) -> Result<(), PostValidationError> {
        if content.trim().is_empty() {
            return Err(PostValidationError::EmptyContent);
        }
        self.reading_time_minutes = reading_time_minutes(&content);
        self.title = title;
        self.content = content;
        self.updated_at = at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn banner() -> HostedImage {
        HostedImage::new("https://images.example/b1", "b1").expect("valid image")
    }

    #[rstest]
    #[case("", 0)]
    #[case("one two three", 1)]
    fn short_texts_read_in_under_a_minute(#[case] text: &str, #[case] expected: u64) {
        assert_eq!(reading_time_minutes(text), expected);
    }

    #[rstest]
    fn reading_time_rounds_up() {
        let two_hundred_one = ["word"; 201].join(" ");
        assert_eq!(reading_time_minutes(&two_hundred_one), 2);
        let four_hundred = ["word"; 400].join(" ");
        assert_eq!(reading_time_minutes(&four_hundred), 2);
    }

    #[rstest]
    fn publishing_zeroes_counters_and_estimates_reading_time() {
        let post = Post::publish(
            UserId::random(),
            Title::new("Hello").expect("valid title"),
            ["word"; 250].join(" "),
            banner(),
            Utc::now(),
        )
        .expect("valid post");
        assert_eq!(post.reaction_count, 0);
        assert_eq!(post.bookmark_count, 0);
        assert_eq!(post.visit_count, 0);
        assert_eq!(post.reading_time_minutes, 2);
        assert_eq!(post.created_at, post.updated_at);
    }

    #[rstest]
    fn edits_replace_content_but_not_counters() {
        let mut post = Post::publish(
            UserId::random(),
            Title::new("Hello").expect("valid title"),
            "short body".to_owned(),
            banner(),
            Utc::now(),
        )
        .expect("valid post");
        post.reaction_count = 4;
        post.visit_count = 9;

        let later = post.created_at + chrono::Duration::minutes(5);
        post.apply_edit(
            Title::new("Hello again").expect("valid title"),
            ["word"; 450].join(" "),
            later,
        )
        .expect("valid edit");

        assert_eq!(post.title.as_str(), "Hello again");
        assert_eq!(post.reading_time_minutes, 3);
        assert_eq!(post.reaction_count, 4);
        assert_eq!(post.visit_count, 9);
        assert_eq!(post.updated_at, later);
    }

    #[rstest]
    fn empty_content_is_rejected() {
        let err = Post::publish(
            UserId::random(),
            Title::new("Hello").expect("valid title"),
            "   ".to_owned(),
            banner(),
            Utc::now(),
        )
        .expect_err("blank content rejected");
        assert_eq!(err, PostValidationError::EmptyContent);
    }
}
