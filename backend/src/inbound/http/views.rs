//! JSON view models shared by the post and feed handlers.
//!
//! The presentation layer is an external collaborator; these DTOs are the
//! data it renders. Counters and timestamps come straight off the domain
//! aggregates.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use pagination::PageWindow;

use crate::domain::Post;
use crate::domain::ports::{AuthorCard, PostWithAuthor};

/// Author fields rendered alongside a post.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<&AuthorCard> for AuthorView {
    fn from(card: &AuthorCard) -> Self {
        Self {
            username: card.username.to_string(),
            display_name: card.display_name.to_string(),
            avatar_url: card.avatar_url.clone(),
        }
    }
}

/// Full post body, returned from detail and mutation endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub banner_url: String,
    pub reading_time_minutes: u64,
    pub reaction_count: u64,
    pub bookmark_count: u64,
    pub visit_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.to_string(),
            content: post.content.clone(),
            banner_url: post.banner.url.clone(),
            reading_time_minutes: post.reading_time_minutes,
            reaction_count: post.reaction_count,
            bookmark_count: post.bookmark_count,
            visit_count: post.visit_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Post card rendered in listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostCardView {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub title: String,
    pub banner_url: String,
    pub reading_time_minutes: u64,
    pub reaction_count: u64,
    pub bookmark_count: u64,
    pub created_at: DateTime<Utc>,
    pub author: AuthorView,
}

impl PostCardView {
    /// Build a card from a post and its author's view.
    pub fn new(post: &Post, author: AuthorView) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.to_string(),
            banner_url: post.banner.url.clone(),
            reading_time_minutes: post.reading_time_minutes,
            reaction_count: post.reaction_count,
            bookmark_count: post.bookmark_count,
            created_at: post.created_at,
            author,
        }
    }
}

impl From<&PostWithAuthor> for PostCardView {
    fn from(entry: &PostWithAuthor) -> Self {
        Self::new(&entry.post, AuthorView::from(&entry.author))
    }
}

/// One page of post cards plus the navigation window.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedView {
    pub posts: Vec<PostCardView>,
    #[schema(value_type = Object)]
    pub pagination: PageWindow,
}
