//! Session helpers keeping HTTP handlers free of framework-specific logic.
//!
//! The signed-in profile is mirrored into the session cookie so navigation
//! chrome renders without a user lookup; settings handlers refresh the mirror
//! after username, display-name, or avatar changes. The mirror is display
//! data only; authorization always goes through the id.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, User, UserId};

pub(crate) const SESSION_USER_KEY: &str = "user";

/// Profile mirror stored in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// Stable account id, the authorization identity.
    pub id: String,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.to_string(),
            display_name: user.display_name.to_string(),
            avatar_url: user.avatar_url().map(str::to_owned),
        }
    }
}

/// Newtype wrapper exposing higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Mirror the given account into the session cookie.
    pub fn persist_user(&self, user: &User) -> Result<(), Error> {
        self.0
            .insert(SESSION_USER_KEY, SessionUser::from(user))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the mirrored profile, if a user is signed in.
    pub fn current_user(&self) -> Result<Option<SessionUser>, Error> {
        self.0
            .get::<SessionUser>(SESSION_USER_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }

    /// Fetch the signed-in account id, if any.
    ///
    /// A mirror with an unparseable id is treated as signed out rather than
    /// an error; it can only arise from a tampered or stale cookie.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        match self.current_user()? {
            Some(user) => match UserId::new(&user.id) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require a signed-in account id or fail with `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop the session entirely (logout, account deletion).
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
