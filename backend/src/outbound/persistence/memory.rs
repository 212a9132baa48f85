//! In-memory document-store adapters.
//!
//! Each store keeps whole aggregates in a [`RwLock`]ed map, mirroring a
//! document database: no cross-record transaction, but every individual
//! operation (including the counter and membership adjustments) is atomic
//! because it runs under the write lock. Locks are never held across an
//! await point.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    MembershipChange, MembershipSet, OwnerTotalsDelta, PostCounterDelta, PostStore, StoreError,
    UserStore,
};
use crate::domain::post::{Post, PostId};
use crate::domain::user::{Email, User, UserId, Username};

/// Apply a signed delta to an unsigned counter, saturating at the bounds.
fn apply_delta(value: u64, delta: i64) -> u64 {
    if delta >= 0 {
        value.saturating_add(delta.unsigned_abs())
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}

fn window(skip: u64, limit: u64) -> (usize, usize) {
    (
        usize::try_from(skip).unwrap_or(usize::MAX),
        usize::try_from(limit).unwrap_or(usize::MAX),
    )
}

/// In-memory [`UserStore`].
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    records: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    fn read(&self) -> RwLockReadGuard<'_, HashMap<UserId, User>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<UserId, User>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn duplicate_field(
        records: &HashMap<UserId, User>,
        candidate: &User,
    ) -> Option<&'static str> {
        for (id, existing) in records {
            if *id == candidate.id {
                continue;
            }
            if existing.email == candidate.email {
                return Some("email");
            }
            if existing.username == candidate.username {
                return Some("username");
            }
        }
        None
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read().get(id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()
            .values()
            .find(|user| user.username == *username)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()
            .values()
            .find(|user| user.email == *email)
            .cloned())
    }

    async fn username_in_use(&self, username: &Username) -> Result<bool, StoreError> {
        Ok(self.read().values().any(|user| user.username == *username))
    }

    async fn email_in_use(&self, email: &Email) -> Result<bool, StoreError> {
        Ok(self.read().values().any(|user| user.email == *email))
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut records = self.write();
        if records.contains_key(&user.id) {
            return Err(StoreError::Duplicate { field: "id" });
        }
        if let Some(field) = Self::duplicate_field(&records, user) {
            return Err(StoreError::Duplicate { field });
        }
        records.insert(user.id, user.clone());
        Ok(())
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let mut records = self.write();
        if !records.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        if let Some(field) = Self::duplicate_field(&records, user) {
            return Err(StoreError::Duplicate { field });
        }
        records.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), StoreError> {
        self.write().remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn update_membership(
        &self,
        id: &UserId,
        set: MembershipSet,
        change: MembershipChange,
        post: &PostId,
    ) -> Result<bool, StoreError> {
        let mut records = self.write();
        let user = records.get_mut(id).ok_or(StoreError::NotFound)?;
        let list = match set {
            MembershipSet::OwnedPosts => &mut user.posts,
            MembershipSet::ReactedPosts => &mut user.reacted_posts,
            MembershipSet::ReadingList => &mut user.reading_list,
        };
        let changed = match change {
            MembershipChange::Add => {
                if list.contains(post) {
                    false
                } else {
                    list.push(*post);
                    true
                }
            }
            MembershipChange::Remove => match list.iter().position(|entry| entry == post) {
                Some(index) => {
                    list.remove(index);
                    true
                }
                None => false,
            },
        };
        Ok(changed)
    }

    async fn adjust_totals(&self, id: &UserId, delta: OwnerTotalsDelta) -> Result<(), StoreError> {
        let mut records = self.write();
        let user = records.get_mut(id).ok_or(StoreError::NotFound)?;
        user.posts_published = apply_delta(user.posts_published, delta.published);
        user.total_reactions = apply_delta(user.total_reactions, delta.reactions);
        user.total_visits = apply_delta(user.total_visits, delta.visits);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredPost {
    /// Monotonic insertion order, the tiebreak for equal timestamps.
    seq: u64,
    post: Post,
}

/// In-memory [`PostStore`].
#[derive(Debug, Default)]
pub struct InMemoryPostStore {
    records: RwLock<HashMap<PostId, StoredPost>>,
    next_seq: AtomicU64,
}

impl InMemoryPostStore {
    fn read(&self) -> RwLockReadGuard<'_, HashMap<PostId, StoredPost>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PostId, StoredPost>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Newest-first snapshot of every record matching `filter`.
    fn sorted_matching(&self, filter: impl Fn(&Post) -> bool) -> Vec<Post> {
        let records = self.read();
        let mut matching: Vec<&StoredPost> = records
            .values()
            .filter(|stored| filter(&stored.post))
            .collect();
        matching.sort_by(|a, b| {
            (b.post.created_at, b.seq).cmp(&(a.post.created_at, a.seq))
        });
        matching.into_iter().map(|stored| stored.post.clone()).collect()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, StoreError> {
        Ok(self.read().get(id).map(|stored| stored.post.clone()))
    }

    async fn insert(&self, post: &Post) -> Result<(), StoreError> {
        let mut records = self.write();
        if records.contains_key(&post.id) {
            return Err(StoreError::Duplicate { field: "id" });
        }
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        records.insert(
            post.id,
            StoredPost {
                seq,
                post: post.clone(),
            },
        );
        Ok(())
    }

    async fn save(&self, post: &Post) -> Result<(), StoreError> {
        let mut records = self.write();
        let stored = records.get_mut(&post.id).ok_or(StoreError::NotFound)?;
        stored.post = post.clone();
        Ok(())
    }

    async fn delete(&self, id: &PostId) -> Result<(), StoreError> {
        self.write().remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn delete_by_owner(&self, owner: &UserId) -> Result<u64, StoreError> {
        let mut records = self.write();
        let before = records.len();
        records.retain(|_, stored| stored.post.owner != *owner);
        Ok((before - records.len()) as u64)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.read().len() as u64)
    }

    async fn list_recent(&self, skip: u64, limit: u64) -> Result<Vec<Post>, StoreError> {
        let (skip, limit) = window(skip, limit);
        Ok(self
            .sorted_matching(|_| true)
            .into_iter()
            .skip(skip)
            .take(limit)
            .collect())
    }

    async fn list_by_ids(
        &self,
        ids: &[PostId],
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Post>, StoreError> {
        let (skip, limit) = window(skip, limit);
        let records = self.read();
        Ok(ids
            .iter()
            .filter_map(|id| records.get(id).map(|stored| stored.post.clone()))
            .skip(skip)
            .take(limit)
            .collect())
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Post>, StoreError> {
        let (skip, limit) = window(skip, limit);
        Ok(self
            .sorted_matching(|post| post.owner == *owner)
            .into_iter()
            .skip(skip)
            .take(limit)
            .collect())
    }

    async fn list_more_from_owner(
        &self,
        owner: &UserId,
        exclude: &PostId,
        limit: u64,
    ) -> Result<Vec<Post>, StoreError> {
        let (_, limit) = window(0, limit);
        Ok(self
            .sorted_matching(|post| post.owner == *owner && post.id != *exclude)
            .into_iter()
            .take(limit)
            .collect())
    }

    async fn adjust_counters(
        &self,
        id: &PostId,
        delta: PostCounterDelta,
    ) -> Result<Post, StoreError> {
        let mut records = self.write();
        let stored = records.get_mut(id).ok_or(StoreError::NotFound)?;
        stored.post.reaction_count = apply_delta(stored.post.reaction_count, delta.reactions);
        stored.post.bookmark_count = apply_delta(stored.post.bookmark_count, delta.bookmarks);
        stored.post.visit_count = apply_delta(stored.post.visit_count, delta.visits);
        Ok(stored.post.clone())
    }
}
