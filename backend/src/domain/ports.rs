//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports ([`UserStore`], [`PostStore`], [`ImageHost`],
//! [`PasswordHasher`]) describe how the domain expects to reach databases and
//! third-party services; driving ports ([`LoginService`], [`AccountCommand`],
//! [`PostCommand`], [`EngagementCommand`], [`FeedQuery`], ...) are the
//! use-cases inbound adapters call. Each trait exposes strongly typed errors
//! so adapters map their failures into predictable variants.
//!
//! The stores deliberately expose field-level mutation primitives
//! ([`PostStore::adjust_counters`], [`UserStore::adjust_totals`],
//! [`UserStore::update_membership`]) in addition to whole-record `save`:
//! engagement counters must be incremented atomically at the storage layer,
//! not read-modify-written, or concurrent requests lose updates.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error as ThisError;

use pagination::PageWindow;

use super::auth::{LoginCredentials, PasswordChange, Registration};
use super::error::Error;
use super::post::{Post, PostId, Title};
use super::user::{DisplayName, Email, User, UserId, Username};

/// Errors surfaced by the store adapters.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum StoreError {
    /// Store connectivity failure.
    #[error("store connection failed: {message}")]
    Connection { message: String },
    /// A mutation targeted a record that does not exist.
    #[error("record not found")]
    NotFound,
    /// A unique field collided with an existing record.
    #[error("duplicate {field}")]
    Duplicate { field: &'static str },
}

impl StoreError {
    /// Helper for connection-oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connection { message } => {
                Self::service_unavailable(format!("store unreachable: {message}"))
            }
            StoreError::NotFound => Self::not_found("record not found"),
            StoreError::Duplicate { field } => Self::conflict(format!("duplicate {field}")),
        }
    }
}

/// Errors surfaced by the image-host adapter.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ImageHostError {
    /// Upload could not be completed.
    #[error("image upload failed: {message}")]
    Upload { message: String },
}

impl ImageHostError {
    /// Helper for upload failures.
    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload {
            message: message.into(),
        }
    }
}

impl From<ImageHostError> for Error {
    fn from(err: ImageHostError) -> Self {
        Self::internal(format!("image host failure: {err}"))
    }
}

/// Errors surfaced by the password-hashing adapter.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum PasswordHashError {
    /// Hashing or verification could not run.
    #[error("password hashing failed: {message}")]
    Hashing { message: String },
}

impl PasswordHashError {
    /// Helper for hashing failures.
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }
}

impl From<PasswordHashError> for Error {
    fn from(err: PasswordHashError) -> Self {
        Self::internal(format!("credential hashing failure: {err}"))
    }
}

/// The membership list on a [`User`] targeted by [`UserStore::update_membership`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipSet {
    /// Insertion-ordered list of owned posts.
    OwnedPosts,
    /// Posts the user has reacted to.
    ReactedPosts,
    /// The user's reading list.
    ReadingList,
}

/// Direction of a membership mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    Add,
    Remove,
}

/// Field-level adjustments applied atomically to a post's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostCounterDelta {
    pub reactions: i64,
    pub bookmarks: i64,
    pub visits: i64,
}

impl PostCounterDelta {
    /// Delta touching only the reaction counter.
    pub const fn reactions(reactions: i64) -> Self {
        Self {
            reactions,
            bookmarks: 0,
            visits: 0,
        }
    }

    /// Delta touching only the bookmark counter.
    pub const fn bookmarks(bookmarks: i64) -> Self {
        Self {
            reactions: 0,
            bookmarks,
            visits: 0,
        }
    }

    /// Delta touching only the visit counter.
    pub const fn visits(visits: i64) -> Self {
        Self {
            reactions: 0,
            bookmarks: 0,
            visits,
        }
    }
}

/// Field-level adjustments applied atomically to a user's aggregate totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnerTotalsDelta {
    pub published: i64,
    pub reactions: i64,
    pub visits: i64,
}

impl OwnerTotalsDelta {
    /// Delta touching only the total-reactions aggregate.
    pub const fn reactions(reactions: i64) -> Self {
        Self {
            published: 0,
            reactions,
            visits: 0,
        }
    }

    /// Delta touching only the total-visits aggregate.
    pub const fn visits(visits: i64) -> Self {
        Self {
            published: 0,
            reactions: 0,
            visits,
        }
    }

    /// Delta recording one newly published post.
    pub const fn published(published: i64) -> Self {
        Self {
            published,
            reactions: 0,
            visits: 0,
        }
    }

    /// Delta rolling a deleted post's counters out of its owner's totals.
    ///
    /// Must be computed from the post's counters as read *before* the delete;
    /// the values vanish with the record.
    pub fn retract(post: &Post) -> Self {
        Self {
            published: -1,
            reactions: -clamped(post.reaction_count),
            visits: -clamped(post.visit_count),
        }
    }
}

fn clamped(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Persistence port for user aggregates.
///
/// Finds return `Ok(None)` for missing records; mutations on missing ids
/// return [`StoreError::NotFound`]. Within one request the store provides
/// read-your-write consistency; it provides no cross-record transaction.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Fetch a user by username.
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, StoreError>;

    /// Fetch a user by email address.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    /// Whether any account already uses the given username.
    async fn username_in_use(&self, username: &Username) -> Result<bool, StoreError>;

    /// Whether any account already uses the given email address.
    async fn email_in_use(&self, email: &Email) -> Result<bool, StoreError>;

    /// Insert a new account, failing with [`StoreError::Duplicate`] on
    /// username or email collisions.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    /// Replace the stored record with the given aggregate.
    async fn save(&self, user: &User) -> Result<(), StoreError>;

    /// Delete an account record.
    async fn delete(&self, id: &UserId) -> Result<(), StoreError>;

    /// Atomically mutate one membership list. Returns whether the list
    /// changed (`false` for an add of a present id or a remove of an absent
    /// one).
    async fn update_membership(
        &self,
        id: &UserId,
        set: MembershipSet,
        change: MembershipChange,
        post: &PostId,
    ) -> Result<bool, StoreError>;

    /// Atomically apply a delta to the aggregate totals, saturating at zero.
    async fn adjust_totals(&self, id: &UserId, delta: OwnerTotalsDelta) -> Result<(), StoreError>;
}

/// Persistence port for post aggregates.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Fetch a post by identifier.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, StoreError>;

    /// Insert a new post record.
    async fn insert(&self, post: &Post) -> Result<(), StoreError>;

    /// Replace the stored record with the given aggregate.
    async fn save(&self, post: &Post) -> Result<(), StoreError>;

    /// Delete a post record.
    async fn delete(&self, id: &PostId) -> Result<(), StoreError>;

    /// Delete every post owned by the given user, returning how many went.
    async fn delete_by_owner(&self, owner: &UserId) -> Result<u64, StoreError>;

    /// Total number of stored posts.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Newest-first window over all posts.
    async fn list_recent(&self, skip: u64, limit: u64) -> Result<Vec<Post>, StoreError>;

    /// Window over the given ids, preserving their order; missing ids are
    /// skipped.
    async fn list_by_ids(
        &self,
        ids: &[PostId],
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Post>, StoreError>;

    /// Newest-first window over one owner's posts.
    async fn list_by_owner(
        &self,
        owner: &UserId,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Post>, StoreError>;

    /// Up to `limit` newest posts by `owner`, excluding `exclude`.
    async fn list_more_from_owner(
        &self,
        owner: &UserId,
        exclude: &PostId,
        limit: u64,
    ) -> Result<Vec<Post>, StoreError>;

    /// Atomically apply a delta to the engagement counters, saturating at
    /// zero, and return the updated record.
    async fn adjust_counters(
        &self,
        id: &PostId,
        delta: PostCounterDelta,
    ) -> Result<Post, StoreError>;
}

/// Port for the third-party image host.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload a base64 image under the given public id and return its secure
    /// URL. Re-uploading under an existing id replaces the asset.
    async fn upload(&self, image_base64: &str, public_id: &str) -> Result<String, ImageHostError>;
}

/// Port for password hashing and verification.
#[cfg_attr(test, automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password for storage.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}

/// Image host standing in when no real endpoint is configured (dev and
/// tests). Returns a deterministic URL derived from the public id.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureImageHost;

#[async_trait]
impl ImageHost for FixtureImageHost {
    async fn upload(&self, _image_base64: &str, public_id: &str) -> Result<String, ImageHostError> {
        Ok(format!("https://images.invalid/{public_id}"))
    }
}

/// New-post input accepted by [`PostCommand::create`].
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: Title,
    pub content: String,
    /// Base64 banner payload destined for the image host.
    pub banner_base64: String,
}

/// Edit input accepted by [`PostCommand::update`].
#[derive(Debug, Clone)]
pub struct PostPatch {
    pub title: Title,
    pub content: String,
    /// Replacement banner, re-uploaded under the post's existing public id.
    pub banner_base64: Option<String>,
}

/// Settings input accepted by [`AccountCommand::update_profile`].
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub display_name: DisplayName,
    pub bio: Option<String>,
    /// Replacement username; uniqueness-checked when it differs.
    pub username: Option<Username>,
    /// Replacement email; uniqueness-checked when it differs.
    pub email: Option<Email>,
    /// New avatar payload, uploaded under the username as public id.
    pub avatar_base64: Option<String>,
}

/// Author fields shown alongside a post.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorCard {
    pub username: Username,
    pub display_name: DisplayName,
    pub avatar_url: Option<String>,
}

impl From<&User> for AuthorCard {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url().map(str::to_owned),
        }
    }
}

/// A post joined with its author card.
#[derive(Debug, Clone, PartialEq)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: AuthorCard,
}

/// One page of a post listing plus its navigation window.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage {
    pub posts: Vec<PostWithAuthor>,
    pub window: PageWindow,
}

/// The signed-in viewer's engagement state for a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewerEngagement {
    pub reacted: bool,
    pub saved: bool,
}

/// Full post detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetail {
    pub post: Post,
    pub author: AuthorCard,
    /// Up to three more posts from the same author.
    pub more_from_author: Vec<Post>,
    /// Present only when a viewer is signed in.
    pub viewer: Option<ViewerEngagement>,
}

/// A user's public profile with one page of their posts.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub username: Username,
    pub display_name: DisplayName,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub joined_at: chrono::DateTime<chrono::Utc>,
    pub posts_published: u64,
    pub posts: Vec<Post>,
    pub window: PageWindow,
}

/// The signed-in user's aggregates and per-post engagement numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub posts_published: u64,
    pub total_visits: u64,
    pub total_reactions: u64,
    pub posts: Vec<Post>,
}

/// Driving port: authenticate login credentials.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Resolve credentials to the matching account.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}

/// Driving port: account lifecycle and settings.
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Register a new account.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Update display name, bio, and optionally username/email/avatar,
    /// returning the updated aggregate.
    async fn update_profile(&self, acting: &UserId, update: ProfileUpdate) -> Result<User, Error>;

    /// Change the password after verifying the current one.
    async fn change_password(&self, acting: &UserId, change: PasswordChange) -> Result<(), Error>;

    /// Delete the account and every post it owns.
    async fn delete_account(&self, acting: &UserId) -> Result<(), Error>;
}

/// Driving port: read the signed-in user's own record.
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Fetch the acting user's account for the settings page.
    async fn settings(&self, acting: &UserId) -> Result<User, Error>;
}

/// Driving port: post lifecycle.
#[async_trait]
pub trait PostCommand: Send + Sync {
    /// Publish a new post under the acting user.
    async fn create(&self, acting: &UserId, draft: NewPost) -> Result<Post, Error>;

    /// Edit a post the acting user owns.
    async fn update(&self, acting: &UserId, post_id: &PostId, patch: PostPatch)
    -> Result<Post, Error>;

    /// Delete a post the acting user owns, reconciling their aggregates.
    async fn delete(&self, acting: &UserId, post_id: &PostId) -> Result<(), Error>;
}

/// Driving port: post detail reads.
#[async_trait]
pub trait PostQuery: Send + Sync {
    /// Fetch a post with author, related posts, and the viewer's engagement
    /// state.
    async fn detail(&self, viewer: Option<&UserId>, post_id: &PostId) -> Result<PostDetail, Error>;
}

/// Driving port: reactions, reading list, and visit recording.
#[async_trait]
pub trait EngagementCommand: Send + Sync {
    /// React to a post (at most once per user).
    async fn add_reaction(&self, acting: &UserId, post_id: &PostId) -> Result<(), Error>;

    /// Withdraw a previously added reaction.
    async fn remove_reaction(&self, acting: &UserId, post_id: &PostId) -> Result<(), Error>;

    /// Put a post on the acting user's reading list (at most once).
    async fn add_to_reading_list(&self, acting: &UserId, post_id: &PostId) -> Result<(), Error>;

    /// Take a post off the acting user's reading list.
    async fn remove_from_reading_list(
        &self,
        acting: &UserId,
        post_id: &PostId,
    ) -> Result<(), Error>;

    /// Record one view. Never rejected; repeat views all count.
    async fn record_visit(&self, post_id: &PostId) -> Result<(), Error>;
}

/// Driving port: paged listings and per-user dashboards.
#[async_trait]
pub trait FeedQuery: Send + Sync {
    /// Newest-first window over all posts.
    async fn home(&self, page: Option<i64>) -> Result<FeedPage, Error>;

    /// The acting user's reading list in insertion order.
    async fn reading_list(&self, acting: &UserId, page: Option<i64>) -> Result<FeedPage, Error>;

    /// A public profile with one page of that user's posts.
    async fn profile(&self, username: &Username, page: Option<i64>) -> Result<ProfileView, Error>;

    /// The acting user's dashboard.
    async fn dashboard(&self, acting: &UserId) -> Result<DashboardView, Error>;
}
