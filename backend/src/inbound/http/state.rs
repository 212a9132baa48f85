//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle via `actix_web::web::Data`, so they depend on
//! driving ports only and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AccountQuery, EngagementCommand, FeedQuery, ImageHost, LoginService,
    PasswordHasher, PostCommand, PostQuery, PostStore, UserStore,
};
use crate::domain::{AccountService, EngagementService, FeedService, PostService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountCommand>,
    pub account_query: Arc<dyn AccountQuery>,
    pub posts: Arc<dyn PostCommand>,
    pub post_query: Arc<dyn PostQuery>,
    pub engagement: Arc<dyn EngagementCommand>,
    pub feeds: Arc<dyn FeedQuery>,
}

impl HttpState {
    /// Wire the domain services over one pair of stores and the given
    /// collaborators.
    pub fn assemble<U, P>(
        users: Arc<U>,
        posts: Arc<P>,
        hasher: Arc<dyn PasswordHasher>,
        images: Arc<dyn ImageHost>,
    ) -> Self
    where
        U: UserStore + 'static,
        P: PostStore + 'static,
    {
        let accounts = Arc::new(AccountService::new(
            users.clone(),
            posts.clone(),
            hasher,
            images.clone(),
        ));
        let post_service = Arc::new(PostService::new(users.clone(), posts.clone(), images));
        let engagement = Arc::new(EngagementService::new(users.clone(), posts.clone()));
        let feeds = Arc::new(FeedService::new(users, posts));

        Self {
            login: accounts.clone(),
            account_query: accounts.clone(),
            accounts,
            post_query: post_service.clone(),
            posts: post_service,
            engagement,
            feeds,
        }
    }
}
