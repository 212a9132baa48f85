//! Engagement use-cases: reactions, reading-list membership, and visits.
//!
//! Every operation here mutates two aggregates, the post and a user, as a
//! named [`WriteUnit`]. Counter mutations go through the stores' atomic
//! adjustment primitives; the service contributes the membership guards and
//! the pairing rules, not the arithmetic.
//!
//! Write ordering: reactions and visits write the post side first, then the
//! acting user / author side. Reading-list changes write the acting user's
//! membership first and the post's bookmark counter second, matching the
//! shape of the listing queries (the reading list is read from the user, the
//! counter is display-only).

use std::sync::Arc;

use async_trait::async_trait;

use super::error::Error;
use super::ports::{
    EngagementCommand, MembershipChange, MembershipSet, OwnerTotalsDelta, PostCounterDelta,
    PostStore, UserStore,
};
use super::post::PostId;
use super::user::{User, UserId};
use super::write_unit::WriteUnit;

/// Engagement service implementing [`EngagementCommand`].
#[derive(Clone)]
pub struct EngagementService<U, P> {
    users: Arc<U>,
    posts: Arc<P>,
}

impl<U, P> EngagementService<U, P> {
    /// Create a new service over the given stores.
    pub fn new(users: Arc<U>, posts: Arc<P>) -> Self {
        Self { users, posts }
    }
}

impl<U, P> EngagementService<U, P>
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

    async fn require_post_exists(&self, post_id: &PostId) -> Result<(), Error> {
        self.posts
            .find_by_id(post_id)
            .await
            .map_err(Error::from)?
            .map(|_| ())
            .ok_or_else(|| Error::not_found("no such post"))
    }
}

#[async_trait]
impl<U, P> EngagementCommand for EngagementService<U, P>
where
    U: UserStore,
    P: PostStore,
{
    async fn add_reaction(&self, acting: &UserId, post_id: &PostId) -> Result<(), Error> {
        let user = self.require_account(acting).await?;
        if user.has_reacted_to(post_id) {
            return Err(Error::invalid_request("already reacted to this post"));
        }

        let mut unit = WriteUnit::new("add_reaction");
        let post = unit.apply(
            "post.reaction_count",
            self.posts
                .adjust_counters(post_id, PostCounterDelta::reactions(1))
                .await,
        )?;
        unit.apply(
            "user.reacted_posts",
            self.users
                .update_membership(
                    acting,
                    MembershipSet::ReactedPosts,
                    MembershipChange::Add,
                    post_id,
                )
                .await,
        )?;
        unit.apply(
            "author.total_reactions",
            self.users
                .adjust_totals(&post.owner, OwnerTotalsDelta::reactions(1))
                .await,
        )?;
        Ok(())
    }

    async fn remove_reaction(&self, acting: &UserId, post_id: &PostId) -> Result<(), Error> {
        let user = self.require_account(acting).await?;
        if !user.has_reacted_to(post_id) {
            return Err(Error::invalid_request("not reacted to this post"));
        }

        let mut unit = WriteUnit::new("remove_reaction");
        let post = unit.apply(
            "post.reaction_count",
            self.posts
                .adjust_counters(post_id, PostCounterDelta::reactions(-1))
                .await,
        )?;
        unit.apply(
            "user.reacted_posts",
            self.users
                .update_membership(
                    acting,
                    MembershipSet::ReactedPosts,
                    MembershipChange::Remove,
                    post_id,
                )
                .await,
        )?;
        unit.apply(
            "author.total_reactions",
            self.users
                .adjust_totals(&post.owner, OwnerTotalsDelta::reactions(-1))
                .await,
        )?;
        Ok(())
    }

    async fn add_to_reading_list(&self, acting: &UserId, post_id: &PostId) -> Result<(), Error> {
        let user = self.require_account(acting).await?;
        if user.has_saved(post_id) {
            return Err(Error::invalid_request("already on the reading list"));
        }
        // The user side is written first here, so the existence check cannot
        // be left to the counter write.
        self.require_post_exists(post_id).await?;

        let mut unit = WriteUnit::new("add_to_reading_list");
        unit.apply(
            "user.reading_list",
            self.users
                .update_membership(
                    acting,
                    MembershipSet::ReadingList,
                    MembershipChange::Add,
                    post_id,
                )
                .await,
        )?;
        unit.apply(
            "post.bookmark_count",
            self.posts
                .adjust_counters(post_id, PostCounterDelta::bookmarks(1))
                .await,
        )?;
        Ok(())
    }

    async fn remove_from_reading_list(
        &self,
        acting: &UserId,
        post_id: &PostId,
    ) -> Result<(), Error> {
        let user = self.require_account(acting).await?;
        if !user.has_saved(post_id) {
            return Err(Error::invalid_request("not on the reading list"));
        }

        let mut unit = WriteUnit::new("remove_from_reading_list");
        unit.apply(
            "user.reading_list",
            self.users
                .update_membership(
                    acting,
                    MembershipSet::ReadingList,
                    MembershipChange::Remove,
                    post_id,
                )
                .await,
        )?;
        unit.apply(
            "post.bookmark_count",
            self.posts
                .adjust_counters(post_id, PostCounterDelta::bookmarks(-1))
                .await,
        )?;
        Ok(())
    }

    async fn record_visit(&self, post_id: &PostId) -> Result<(), Error> {
        let mut unit = WriteUnit::new("record_visit");
        let post = unit.apply(
            "post.visit_count",
            self.posts
                .adjust_counters(post_id, PostCounterDelta::visits(1))
                .await,
        )?;
        unit.apply(
            "author.total_visits",
            self.users
                .adjust_totals(&post.owner, OwnerTotalsDelta::visits(1))
                .await,
        )?;
        Ok(())
    }
}
