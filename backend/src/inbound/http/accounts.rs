//! Account API handlers: registration, login/logout, and settings.
//!
//! ```text
//! POST   /api/v1/register {"name":"Reader","email":"r@example.com","password":"..."}
//! POST   /api/v1/login    {"email":"r@example.com","password":"..."}
//! POST   /api/v1/logout
//! GET    /api/v1/settings
//! PUT    /api/v1/settings/profile
//! PUT    /api/v1/settings/password
//! DELETE /api/v1/settings/account
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    CredentialValidationError, DisplayName, Email, Error, LoginCredentials, PasswordChange,
    Registration, User, UserValidationError, Username,
};
use crate::domain::ports::{AccountCommand as _, AccountQuery as _, LoginService as _, ProfileUpdate};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::{SessionContext, SessionUser};
use crate::inbound::http::state::HttpState;

/// Registration request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name; the username is derived from it.
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Registration response body.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub username: String,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Settings view of the signed-in account.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub username: String,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl From<&User> for SettingsView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.to_string(),
            email: user.email.to_string(),
            display_name: user.display_name.to_string(),
            bio: user.bio.clone(),
            avatar_url: user.avatar_url().map(str::to_owned),
            joined_at: user.created_at,
        }
    }
}

/// Profile-settings request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    /// New display name (always submitted by the settings form).
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    /// Replacement username, when the user edits it.
    #[serde(default)]
    pub username: Option<String>,
    /// Replacement email, when the user edits it.
    #[serde(default)]
    pub email: Option<String>,
    /// Base64 avatar payload, when a new photo was picked.
    #[serde(default)]
    pub profile_photo: Option<String>,
}

/// Password-change request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

fn map_credential_error(err: CredentialValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

fn map_user_error(err: UserValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisteredUser),
        (status = 400, description = "Invalid or duplicate registration", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let registration = Registration::try_from_parts(&payload.name, &payload.email, &payload.password)
        .map_err(map_credential_error)?;
    let user = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(RegisteredUser {
        id: user.id.to_string(),
        username: user.username.to_string(),
    }))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionUser,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid credentials", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(map_credential_error)?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(&user)?;
    Ok(HttpResponse::Ok().json(SessionUser::from(&user)))
}

/// Drop the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session dropped")),
    tags = ["accounts"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Read the signed-in account's settings.
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses(
        (status = 200, description = "Current settings", body = SettingsView),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "getSettings"
)]
#[get("/settings")]
pub async fn settings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SettingsView>> {
    let acting = session.require_user_id()?;
    let user = state.account_query.settings(&acting).await?;
    Ok(web::Json(SettingsView::from(&user)))
}

/// Update display name, bio, username, email, or avatar.
///
/// Changes to the username, display name, or avatar are mirrored back into
/// the session cookie so subsequent requests render fresh values without a
/// lookup.
#[utoipa::path(
    put,
    path = "/api/v1/settings/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated settings", body = SettingsView),
        (status = 400, description = "Invalid or conflicting values", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "updateProfile"
)]
#[put("/settings/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<SettingsView>> {
    let acting = session.require_user_id()?;
    let payload = payload.into_inner();

    let update = ProfileUpdate {
        display_name: DisplayName::new(&payload.name).map_err(map_user_error)?,
        bio: payload.bio.filter(|bio| !bio.trim().is_empty()),
        username: payload
            .username
            .as_deref()
            .map(Username::new)
            .transpose()
            .map_err(map_user_error)?,
        email: payload
            .email
            .as_deref()
            .map(Email::new)
            .transpose()
            .map_err(map_user_error)?,
        avatar_base64: payload.profile_photo,
    };

    let user = state.accounts.update_profile(&acting, update).await?;
    session.persist_user(&user)?;
    Ok(web::Json(SettingsView::from(&user)))
}

/// Change the account password.
#[utoipa::path(
    put,
    path = "/api/v1/settings/password",
    request_body = PasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Current password invalid or new password too weak", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "changePassword"
)]
#[put("/settings/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PasswordRequest>,
) -> ApiResult<HttpResponse> {
    let acting = session.require_user_id()?;
    let change = PasswordChange::try_from_parts(&payload.current_password, &payload.new_password)
        .map_err(map_credential_error)?;
    state.accounts.change_password(&acting, change).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete the account and everything it owns.
#[utoipa::path(
    delete,
    path = "/api/v1/settings/account",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "deleteAccount"
)]
#[delete("/settings/account")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let acting = session.require_user_id()?;
    state.accounts.delete_account(&acting).await?;
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}
