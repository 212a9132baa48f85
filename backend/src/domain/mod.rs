//! Domain aggregates, ports, and services.
//!
//! The domain owns the data model (users, posts, engagement counters), the
//! port traits adapters implement, and the services that realise the
//! use-cases. Nothing here imports from the inbound or outbound layers.

pub mod account_service;
pub mod auth;
pub mod engagement_service;
pub mod error;
pub mod feed_service;
pub mod ports;
pub mod post;
pub mod post_service;
pub mod user;
pub mod write_unit;

#[cfg(test)]
pub mod test_fixtures;

pub use self::account_service::AccountService;
pub use self::auth::{CredentialValidationError, LoginCredentials, PasswordChange, Registration};
pub use self::engagement_service::EngagementService;
pub use self::error::{Error, ErrorCode};
pub use self::feed_service::FeedService;
pub use self::post::{HostedImage, Post, PostId, PostValidationError, Title};
pub use self::post_service::PostService;
pub use self::user::{DisplayName, Email, User, UserId, UserValidationError, Username};
pub use self::write_unit::WriteUnit;
