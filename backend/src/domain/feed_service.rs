//! Listing use-cases: home feed, reading list, profiles, and the dashboard.
//!
//! Each paged listing counts first, computes its [`pagination::PageWindow`],
//! then slices the backing query with the window's skip/limit. Ordering is
//! the store's job (newest first, or reading-list insertion order); this
//! service only joins author cards onto the results.

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use pagination::paginate;

use super::error::Error;
use super::ports::{
    AuthorCard, DashboardView, FeedPage, FeedQuery, PostStore, PostWithAuthor, ProfileView,
    UserStore,
};
use super::post::Post;
use super::user::{User, UserId, Username};

/// Posts per page on the home feed.
const HOME_PAGE_SIZE: NonZeroU64 = NonZeroU64::new(18).unwrap();
/// Posts per page on the reading list.
const READING_LIST_PAGE_SIZE: NonZeroU64 = NonZeroU64::new(20).unwrap();
/// Posts per page on a profile.
const PROFILE_PAGE_SIZE: NonZeroU64 = NonZeroU64::new(20).unwrap();

/// Feed service implementing [`FeedQuery`].
#[derive(Clone)]
pub struct FeedService<U, P> {
    users: Arc<U>,
    posts: Arc<P>,
}

impl<U, P> FeedService<U, P> {
    /// Create a new service over the given stores.
    pub fn new(users: Arc<U>, posts: Arc<P>) -> Self {
        Self { users, posts }
    }
}

impl<U, P> FeedService<U, P>
where
    U: UserStore,
    P: PostStore,
{
    async fn require_account(&self, acting: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(acting)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))
    }

    /// Attach author cards to a page of posts, caching one lookup per author.
    ///
    /// A post whose author record is missing is dropped from the page with a
    /// warning; that state only arises when an account deletion half-failed.
    async fn join_authors(&self, posts: Vec<Post>) -> Result<Vec<PostWithAuthor>, Error> {
        let mut cards: HashMap<UserId, AuthorCard> = HashMap::new();
        let mut joined = Vec::with_capacity(posts.len());
        for post in posts {
            if let Some(card) = cards.get(&post.owner) {
                let author = card.clone();
                joined.push(PostWithAuthor { post, author });
                continue;
            }
            match self
                .users
                .find_by_id(&post.owner)
                .await
                .map_err(Error::from)?
            {
                Some(user) => {
                    let card = AuthorCard::from(&user);
                    cards.insert(post.owner, card.clone());
                    joined.push(PostWithAuthor { post, author: card });
                }
                None => {
                    warn!(owner = %post.owner, post = %post.id, "dropping post whose author record is missing");
                }
            }
        }
        Ok(joined)
    }
}

#[async_trait]
impl<U, P> FeedQuery for FeedService<U, P>
where
    U: UserStore,
    P: PostStore,
{
    async fn home(&self, page: Option<i64>) -> Result<FeedPage, Error> {
        let total = self.posts.count().await.map_err(Error::from)?;
        let window = paginate("/feed/", page, HOME_PAGE_SIZE, total);
        let posts = self
            .posts
            .list_recent(window.skip, window.limit)
            .await
            .map_err(Error::from)?;
        Ok(FeedPage {
            posts: self.join_authors(posts).await?,
            window,
        })
    }

    async fn reading_list(&self, acting: &UserId, page: Option<i64>) -> Result<FeedPage, Error> {
        let user = self.require_account(acting).await?;
        let total = user.reading_list.len() as u64;
        let window = paginate("/readinglist/", page, READING_LIST_PAGE_SIZE, total);
        let posts = self
            .posts
            .list_by_ids(&user.reading_list, window.skip, window.limit)
            .await
            .map_err(Error::from)?;
        Ok(FeedPage {
            posts: self.join_authors(posts).await?,
            window,
        })
    }

    async fn profile(&self, username: &Username, page: Option<i64>) -> Result<ProfileView, Error> {
        let user = self
            .users
            .find_by_username(username)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::not_found("no such profile"))?;

        let total = user.posts.len() as u64;
        let base_route = format!("/profiles/{username}/");
        let window = paginate(&base_route, page, PROFILE_PAGE_SIZE, total);
        let posts = self
            .posts
            .list_by_owner(&user.id, window.skip, window.limit)
            .await
            .map_err(Error::from)?;

        Ok(ProfileView {
            username: user.username,
            display_name: user.display_name,
            bio: user.bio,
            avatar_url: user.avatar.map(|image| image.url),
            joined_at: user.created_at,
            posts_published: user.posts_published,
            posts,
            window,
        })
    }

    async fn dashboard(&self, acting: &UserId) -> Result<DashboardView, Error> {
        let user = self.require_account(acting).await?;
        let posts = self
            .posts
            .list_by_owner(&user.id, 0, u64::MAX)
            .await
            .map_err(Error::from)?;
        Ok(DashboardView {
            posts_published: user.posts_published,
            total_visits: user.total_visits,
            total_reactions: user.total_reactions,
            posts,
        })
    }
}
