//! Account use-cases: registration, login, settings, and account deletion.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::auth::{LoginCredentials, PasswordChange, Registration};
use super::error::Error;
use super::ports::{
    AccountCommand, AccountQuery, ImageHost, LoginService, PasswordHasher, PostStore,
    ProfileUpdate, StoreError, UserStore,
};
use super::post::HostedImage;
use super::user::{User, UserId, Username};
use super::write_unit::WriteUnit;

/// Account service implementing [`LoginService`], [`AccountCommand`], and
/// [`AccountQuery`].
#[derive(Clone)]
pub struct AccountService<U, P> {
    users: Arc<U>,
    posts: Arc<P>,
    hasher: Arc<dyn PasswordHasher>,
    images: Arc<dyn ImageHost>,
}

impl<U, P> AccountService<U, P> {
    /// Create a new service over the given stores and collaborators.
    pub fn new(
        users: Arc<U>,
        posts: Arc<P>,
        hasher: Arc<dyn PasswordHasher>,
        images: Arc<dyn ImageHost>,
    ) -> Self {
        Self {
            users,
            posts,
            hasher,
            images,
        }
    }
}

fn map_registration_conflict(err: StoreError) -> Error {
    match err {
        StoreError::Duplicate { field: "email" } => {
            Error::invalid_request("this email is already associated with an account")
        }
        StoreError::Duplicate { field: "username" } => {
            Error::invalid_request("this username is already in use")
        }
        other => other.into(),
    }
}

impl<U, P> AccountService<U, P>
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
}

#[async_trait]
impl<U, P> LoginService for AccountService<U, P>
where
    U: UserStore,
    P: PostStore,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::invalid_request("no account found with this email address"))?;

        let valid = self
            .hasher
            .verify(credentials.password(), &user.password_hash)?;
        if !valid {
            return Err(Error::invalid_request("invalid password"));
        }
        Ok(user)
    }
}

#[async_trait]
impl<U, P> AccountQuery for AccountService<U, P>
where
    U: UserStore,
    P: PostStore,
{
    async fn settings(&self, acting: &UserId) -> Result<User, Error> {
        self.require_account(acting).await
    }
}

#[async_trait]
impl<U, P> AccountCommand for AccountService<U, P>
where
    U: UserStore,
    P: PostStore,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let now = Utc::now();
        let username = Username::generate(registration.display_name(), now);
        let password_hash = self.hasher.hash(registration.password())?;
        let user = User::register(
            username,
            registration.email().clone(),
            password_hash,
            registration.display_name().clone(),
            now,
        );

        self.users
            .insert(&user)
            .await
            .map_err(map_registration_conflict)?;
        Ok(user)
    }

    async fn update_profile(&self, acting: &UserId, update: ProfileUpdate) -> Result<User, Error> {
        let mut user = self.require_account(acting).await?;

        if let Some(email) = update.email {
            if email != user.email {
                if self.users.email_in_use(&email).await.map_err(Error::from)? {
                    return Err(Error::invalid_request(
                        "an account is already associated with this email address",
                    ));
                }
                user.email = email;
            }
        }

        if let Some(username) = update.username {
            if username != user.username {
                if self
                    .users
                    .username_in_use(&username)
                    .await
                    .map_err(Error::from)?
                {
                    return Err(Error::invalid_request("that username is already taken"));
                }
                user.username = username;
            }
        }

        if let Some(avatar_base64) = update.avatar_base64.as_deref() {
            // The avatar lives under the username, so a rename plus upload in
            // one request files the image under the new handle.
            let public_id = user.username.as_str().to_owned();
            let url = self.images.upload(avatar_base64, &public_id).await?;
            user.avatar = Some(HostedImage::new(url, public_id).map_err(|err| {
                Error::internal(format!("image host returned an unusable asset: {err}"))
            })?);
        }

        user.display_name = update.display_name;
        user.bio = update.bio;

        self.users
            .save(&user)
            .await
            .map_err(map_registration_conflict)?;
        Ok(user)
    }

    async fn change_password(&self, acting: &UserId, change: PasswordChange) -> Result<(), Error> {
        let mut user = self.require_account(acting).await?;

        let valid = self
            .hasher
            .verify(change.current_password(), &user.password_hash)?;
        if !valid {
            return Err(Error::invalid_request("your current password is not valid"));
        }

        user.password_hash = self.hasher.hash(change.new_password())?;
        self.users.save(&user).await.map_err(Error::from)?;
        Ok(())
    }

    async fn delete_account(&self, acting: &UserId) -> Result<(), Error> {
        self.require_account(acting).await?;

        let mut unit = WriteUnit::new("delete_account");
        unit.apply("posts.owned", self.posts.delete_by_owner(acting).await)?;
        unit.apply("user.record", self.users.delete(acting).await)?;
        Ok(())
    }
}
