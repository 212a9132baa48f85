//! Post lifecycle use-cases: publish, edit, delete, and the detail view.
//!
//! Publication and deletion are paired-write operations: the post record and
//! the owner's aggregates (membership list, published/visit/reaction totals)
//! move together as a named [`WriteUnit`]. Deletion reads the post's counters
//! before the record vanishes, since the owner-side subtraction depends on
//! them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::RngCore;

use super::error::Error;
use super::ports::{
    AuthorCard, ImageHost, MembershipChange, MembershipSet, NewPost, OwnerTotalsDelta, PostCommand,
    PostDetail, PostPatch, PostQuery, PostStore, UserStore, ViewerEngagement,
};
use super::post::{HostedImage, Post, PostId, PostValidationError};
use super::user::{User, UserId};
use super::write_unit::WriteUnit;

/// Number of related posts shown under a post detail.
const MORE_FROM_AUTHOR_LIMIT: u64 = 3;

/// Post service implementing [`PostCommand`] and [`PostQuery`].
#[derive(Clone)]
pub struct PostService<U, P> {
    users: Arc<U>,
    posts: Arc<P>,
    images: Arc<dyn ImageHost>,
}

impl<U, P> PostService<U, P> {
    /// Create a new service over the given stores and image host.
    pub fn new(users: Arc<U>, posts: Arc<P>, images: Arc<dyn ImageHost>) -> Self {
        Self {
            users,
            posts,
            images,
        }
    }
}

fn map_validation(err: PostValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

/// Fresh host-side identifier for a banner upload.
fn fresh_public_id() -> String {
    let mut bytes = [0u8; 10];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl<U, P> PostService<U, P>
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

    async fn require_owned_post(&self, acting: &UserId, post_id: &PostId) -> Result<Post, Error> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::not_found("no such post"))?;
        if post.owner != *acting {
            return Err(Error::forbidden("only the author may modify this post"));
        }
        Ok(post)
    }
}

#[async_trait]
impl<U, P> PostCommand for PostService<U, P>
where
    U: UserStore,
    P: PostStore,
{
    async fn create(&self, acting: &UserId, draft: NewPost) -> Result<Post, Error> {
        self.require_account(acting).await?;

        let public_id = fresh_public_id();
        let banner_url = self.images.upload(&draft.banner_base64, &public_id).await?;
        let banner = HostedImage::new(banner_url, public_id)
            .map_err(|err| Error::internal(format!("image host returned an unusable asset: {err}")))?;
        let post = Post::publish(*acting, draft.title, draft.content, banner, Utc::now())
            .map_err(map_validation)?;

        let mut unit = WriteUnit::new("create_post");
        unit.apply("post.record", self.posts.insert(&post).await)?;
        unit.apply(
            "owner.posts",
            self.users
                .update_membership(
                    acting,
                    MembershipSet::OwnedPosts,
                    MembershipChange::Add,
                    &post.id,
                )
                .await,
        )?;
        unit.apply(
            "owner.posts_published",
            self.users
                .adjust_totals(acting, OwnerTotalsDelta::published(1))
                .await,
        )?;
        Ok(post)
    }

    async fn update(
        &self,
        acting: &UserId,
        post_id: &PostId,
        patch: PostPatch,
    ) -> Result<Post, Error> {
        let mut post = self.require_owned_post(acting, post_id).await?;

        if let Some(banner_base64) = patch.banner_base64.as_deref() {
            // Re-upload under the existing public id so the host replaces the
            // asset instead of accumulating orphans.
            let url = self
                .images
                .upload(banner_base64, &post.banner.public_id)
                .await?;
            post.banner.url = url;
        }

        post.apply_edit(patch.title, patch.content, Utc::now())
            .map_err(map_validation)?;
        self.posts.save(&post).await.map_err(Error::from)?;
        Ok(post)
    }

    async fn delete(&self, acting: &UserId, post_id: &PostId) -> Result<(), Error> {
        // Counters must be read before the record goes away; the owner-side
        // subtraction below depends on them.
        let post = self.require_owned_post(acting, post_id).await?;

        let mut unit = WriteUnit::new("delete_post");
        unit.apply(
            "owner.totals",
            self.users
                .adjust_totals(acting, OwnerTotalsDelta::retract(&post))
                .await,
        )?;
        unit.apply(
            "owner.posts",
            self.users
                .update_membership(
                    acting,
                    MembershipSet::OwnedPosts,
                    MembershipChange::Remove,
                    post_id,
                )
                .await,
        )?;
        unit.apply("post.record", self.posts.delete(post_id).await)?;
        Ok(())
    }
}

#[async_trait]
impl<U, P> PostQuery for PostService<U, P>
where
    U: UserStore,
    P: PostStore,
{
    async fn detail(&self, viewer: Option<&UserId>, post_id: &PostId) -> Result<PostDetail, Error> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::not_found("no such post"))?;

        let author = self
            .users
            .find_by_id(&post.owner)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::internal("post author record is missing"))?;

        let more_from_author = self
            .posts
            .list_more_from_owner(&post.owner, post_id, MORE_FROM_AUTHOR_LIMIT)
            .await
            .map_err(Error::from)?;

        let viewer_engagement = match viewer {
            Some(viewer_id) => self
                .users
                .find_by_id(viewer_id)
                .await
                .map_err(Error::from)?
                .map(|user| ViewerEngagement {
                    reacted: user.has_reacted_to(post_id),
                    saved: user.has_saved(post_id),
                }),
            None => None,
        };

        Ok(PostDetail {
            author: AuthorCard::from(&author),
            post,
            more_from_author,
            viewer: viewer_engagement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{
        FixtureImageHost, MockImageHost, PostCounterDelta,
    };
    use crate::domain::post::Title;
    use crate::domain::test_fixtures::{sample_post, sample_user, seeded_stores};

    fn draft(title: &str) -> NewPost {
        NewPost {
            title: Title::new(title).expect("valid title"),
            content: "a body that says something".to_owned(),
            banner_base64: "ZmFrZS1pbWFnZQ==".to_owned(),
        }
    }

    #[tokio::test]
    async fn creating_a_post_updates_the_owner_exactly_once() {
        let (users, posts) = seeded_stores();
        let author = sample_user(&users, "author").await;
        let service = PostService::new(users.clone(), posts.clone(), Arc::new(FixtureImageHost));

        let post = service
            .create(&author.id, draft("Hello"))
            .await
            .expect("post created");

        let stored_author = users
            .find_by_id(&author.id)
            .await
            .expect("find")
            .expect("author");
        assert_eq!(stored_author.posts_published, 1);
        assert_eq!(stored_author.posts, vec![post.id]);
        let stored_post = posts.find_by_id(&post.id).await.expect("find").expect("post");
        assert_eq!(stored_post.reaction_count, 0);
        assert_eq!(stored_post.owner, author.id);
        assert!(stored_post.banner.url.contains(&stored_post.banner.public_id));
    }

    #[tokio::test]
    async fn deleting_a_post_reconciles_the_owner_aggregates() {
        let (users, posts) = seeded_stores();
        let author = sample_user(&users, "author").await;
        let post = sample_post(&users, &posts, &author).await;
        // Engagement accumulated before deletion.
        posts
            .adjust_counters(
                &post.id,
                PostCounterDelta {
                    reactions: 5,
                    bookmarks: 0,
                    visits: 12,
                },
            )
            .await
            .expect("counters seeded");
        users
            .adjust_totals(
                &author.id,
                OwnerTotalsDelta {
                    published: 0,
                    reactions: 5,
                    visits: 12,
                },
            )
            .await
            .expect("totals seeded");

        let service = PostService::new(users.clone(), posts.clone(), Arc::new(FixtureImageHost));
        service
            .delete(&author.id, &post.id)
            .await
            .expect("post deleted");

        let stored_author = users
            .find_by_id(&author.id)
            .await
            .expect("find")
            .expect("author");
        assert_eq!(stored_author.posts_published, 0);
        assert_eq!(stored_author.total_reactions, 0);
        assert_eq!(stored_author.total_visits, 0);
        assert!(stored_author.posts.is_empty());
        assert!(posts.find_by_id(&post.id).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn only_the_author_may_edit_or_delete() {
        let (users, posts) = seeded_stores();
        let author = sample_user(&users, "author").await;
        let intruder = sample_user(&users, "intruder").await;
        let post = sample_post(&users, &posts, &author).await;
        let service = PostService::new(users, posts, Arc::new(FixtureImageHost));

        let err = service
            .delete(&intruder.id, &post.id)
            .await
            .expect_err("delete forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let patch = PostPatch {
            title: Title::new("Hijacked").expect("valid title"),
            content: "rewritten".to_owned(),
            banner_base64: None,
        };
        let err = service
            .update(&intruder.id, &post.id, patch)
            .await
            .expect_err("edit forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn editing_replaces_content_and_reuses_the_banner_public_id() {
        let (users, posts) = seeded_stores();
        let author = sample_user(&users, "author").await;
        let post = sample_post(&users, &posts, &author).await;
        let original_public_id = post.banner.public_id.clone();

        let mut images = MockImageHost::new();
        let expected_public_id = original_public_id.clone();
        images
            .expect_upload()
            .withf(move |_, public_id| public_id == expected_public_id)
            .times(1)
            .return_once(|_, _| Ok("https://images.invalid/replaced".to_owned()));

        let service = PostService::new(users, posts.clone(), Arc::new(images));
        let patch = PostPatch {
            title: Title::new("Edited").expect("valid title"),
            content: "a new body".to_owned(),
            banner_base64: Some("bmV3LWltYWdl".to_owned()),
        };
        let updated = service
            .update(&author.id, &post.id, patch)
            .await
            .expect("edit applied");

        assert_eq!(updated.title.as_str(), "Edited");
        assert_eq!(updated.banner.public_id, original_public_id);
        assert_eq!(updated.banner.url, "https://images.invalid/replaced");
        let stored = posts.find_by_id(&post.id).await.expect("find").expect("post");
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn detail_reports_the_viewer_engagement_state() {
        let (users, posts) = seeded_stores();
        let author = sample_user(&users, "author").await;
        let reader = sample_user(&users, "reader").await;
        let post = sample_post(&users, &posts, &author).await;
        let engagement = crate::domain::EngagementService::new(users.clone(), posts.clone());
        crate::domain::ports::EngagementCommand::add_reaction(&engagement, &reader.id, &post.id)
            .await
            .expect("reaction added");

        let service = PostService::new(users, posts, Arc::new(FixtureImageHost));
        let detail = service
            .detail(Some(&reader.id), &post.id)
            .await
            .expect("detail loads");
        let viewer = detail.viewer.expect("viewer state present");
        assert!(viewer.reacted);
        assert!(!viewer.saved);
        assert_eq!(detail.author.username, author.username);

        let anonymous = service.detail(None, &post.id).await.expect("detail loads");
        assert!(anonymous.viewer.is_none());
    }

    #[tokio::test]
    async fn detail_limits_related_posts_to_three_newest() {
        let (users, posts) = seeded_stores();
        let author = sample_user(&users, "author").await;
        let mut published = Vec::new();
        for _ in 0..5 {
            published.push(sample_post(&users, &posts, &author).await);
        }
        let current = published.last().expect("published at least one");

        let service = PostService::new(users, posts, Arc::new(FixtureImageHost));
        let detail = service
            .detail(None, &current.id)
            .await
            .expect("detail loads");
        assert_eq!(detail.more_from_author.len(), 3);
        assert!(
            detail
                .more_from_author
                .iter()
                .all(|post| post.id != current.id)
        );
    }
}
