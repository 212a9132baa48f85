//! OpenAPI document aggregating every REST endpoint.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::accounts::{
    LoginRequest, PasswordRequest, ProfileRequest, RegisterRequest, RegisteredUser, SettingsView,
};
use crate::inbound::http::feeds::{DashboardResponse, DashboardRow, ProfileResponse};
use crate::inbound::http::posts::{
    CreatePostRequest, PostDetailView, UpdatePostRequest, ViewerView,
};
use crate::inbound::http::session::SessionUser;
use crate::inbound::http::views::{AuthorView, FeedView, PostCardView, PostView};

/// Public OpenAPI surface served at `/api-docs/openapi.json` in debug builds.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::accounts::settings,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::accounts::change_password,
        crate::inbound::http::accounts::delete_account,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::post_detail,
        crate::inbound::http::posts::update_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::engagement::add_reaction,
        crate::inbound::http::engagement::remove_reaction,
        crate::inbound::http::engagement::add_bookmark,
        crate::inbound::http::engagement::remove_bookmark,
        crate::inbound::http::engagement::record_visit,
        crate::inbound::http::feeds::home,
        crate::inbound::http::feeds::home_page,
        crate::inbound::http::feeds::reading_list,
        crate::inbound::http::feeds::reading_list_page,
        crate::inbound::http::feeds::profile,
        crate::inbound::http::feeds::profile_page,
        crate::inbound::http::feeds::dashboard,
    ),
    components(schemas(
        Error,
        ErrorCode,
        SessionUser,
        RegisterRequest,
        RegisteredUser,
        LoginRequest,
        SettingsView,
        ProfileRequest,
        PasswordRequest,
        CreatePostRequest,
        UpdatePostRequest,
        ViewerView,
        PostDetailView,
        PostView,
        PostCardView,
        AuthorView,
        FeedView,
        ProfileResponse,
        DashboardRow,
        DashboardResponse,
    )),
    tags(
        (name = "accounts", description = "Registration, login, and settings"),
        (name = "posts", description = "Post lifecycle"),
        (name = "engagement", description = "Reactions, reading list, visits"),
        (name = "feeds", description = "Listings and dashboards"),
    )
)]
pub struct ApiDoc;
