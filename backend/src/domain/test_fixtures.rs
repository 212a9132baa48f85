//! Shared fixtures for service tests: seeded in-memory stores, sample
//! aggregates, and a deterministic password hasher.

use std::sync::Arc;

use chrono::Utc;

use crate::outbound::persistence::{InMemoryPostStore, InMemoryUserStore};

use super::ports::{
    MembershipChange, MembershipSet, OwnerTotalsDelta, PasswordHashError, PasswordHasher,
    PostStore, UserStore,
};
use super::post::{HostedImage, Post, Title};
use super::user::{DisplayName, Email, User, UserId, Username};

/// Fresh, empty in-memory stores.
pub fn seeded_stores() -> (Arc<InMemoryUserStore>, Arc<InMemoryPostStore>) {
    (
        Arc::new(InMemoryUserStore::default()),
        Arc::new(InMemoryPostStore::default()),
    )
}

/// A registered-but-unstored user derived from `handle`.
pub fn bare_user(handle: &str) -> User {
    User::register(
        Username::new(handle).expect("valid username"),
        Email::new(format!("{handle}@example.com")).expect("valid email"),
        format!("plain:{handle}"),
        DisplayName::new(handle).expect("valid display name"),
        Utc::now(),
    )
}

/// Register and store a user under the given handle.
pub async fn sample_user(users: &Arc<InMemoryUserStore>, handle: &str) -> User {
    let user = bare_user(handle);
    users.insert(&user).await.expect("user inserted");
    user
}

/// A published-but-unstored post owned by `owner`.
pub fn bare_post(owner: UserId) -> Post {
    Post::publish(
        owner,
        Title::new("Sample post").expect("valid title"),
        "a sample body with a handful of words".to_owned(),
        HostedImage::new("https://images.invalid/sample", "sample").expect("valid image"),
        Utc::now(),
    )
    .expect("valid post")
}

/// Publish a post for `author` the way the post service would: record
/// inserted, membership appended, published total incremented.
pub async fn sample_post(
    users: &Arc<InMemoryUserStore>,
    posts: &Arc<InMemoryPostStore>,
    author: &User,
) -> Post {
    let post = bare_post(author.id);
    posts.insert(&post).await.expect("post inserted");
    users
        .update_membership(
            &author.id,
            MembershipSet::OwnedPosts,
            MembershipChange::Add,
            &post.id,
        )
        .await
        .expect("membership added");
    users
        .adjust_totals(&author.id, OwnerTotalsDelta::published(1))
        .await
        .expect("published counted");
    post
}

/// Deterministic hasher so credential tests avoid real key stretching.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        Ok(hash == format!("plain:{password}"))
    }
}

/// The [`PlainHasher`] behind the port's object type.
pub fn plain_hasher() -> Arc<dyn PasswordHasher> {
    Arc::new(PlainHasher)
}
