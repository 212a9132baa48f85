//! Listing API handlers: home feed, reading list, profiles, dashboard.
//!
//! ```text
//! GET /api/v1/feed                     GET /api/v1/feed/page/{page}
//! GET /api/v1/readinglist              GET /api/v1/readinglist/page/{page}
//! GET /api/v1/profiles/{username}      GET /api/v1/profiles/{username}/page/{page}
//! GET /api/v1/dashboard
//! ```
//!
//! Paged routes exist twice because the navigation links produced by the
//! pagination window are path-shaped (`.../page/2`), not query parameters.

use actix_web::{get, web};
use chrono::{DateTime, Utc};
use serde::Serialize;

use pagination::PageWindow;

use crate::domain::ports::{DashboardView, FeedPage, FeedQuery as _, ProfileView};
use crate::domain::{Error, Post, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::{AuthorView, FeedView, PostCardView};

/// Profile response body.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub posts_published: u64,
    pub posts: Vec<PostCardView>,
    #[schema(value_type = Object)]
    pub pagination: PageWindow,
}

impl From<ProfileView> for ProfileResponse {
    fn from(view: ProfileView) -> Self {
        let author = AuthorView {
            username: view.username.to_string(),
            display_name: view.display_name.to_string(),
            avatar_url: view.avatar_url.clone(),
        };
        Self {
            posts: view
                .posts
                .iter()
                .map(|post| PostCardView::new(post, author.clone()))
                .collect(),
            username: author.username.clone(),
            display_name: author.display_name.clone(),
            bio: view.bio,
            avatar_url: view.avatar_url,
            joined_at: view.joined_at,
            posts_published: view.posts_published,
            pagination: view.window,
        }
    }
}

/// One row of the dashboard's post table.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRow {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reaction_count: u64,
    pub visit_count: u64,
}

impl From<&Post> for DashboardRow {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.to_string(),
            created_at: post.created_at,
            updated_at: post.updated_at,
            reaction_count: post.reaction_count,
            visit_count: post.visit_count,
        }
    }
}

/// Dashboard response body.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub posts_published: u64,
    pub total_visits: u64,
    pub total_reactions: u64,
    pub posts: Vec<DashboardRow>,
}

impl From<DashboardView> for DashboardResponse {
    fn from(view: DashboardView) -> Self {
        Self {
            posts_published: view.posts_published,
            total_visits: view.total_visits,
            total_reactions: view.total_reactions,
            posts: view.posts.iter().map(DashboardRow::from).collect(),
        }
    }
}

fn feed_view(page: FeedPage) -> FeedView {
    FeedView {
        posts: page.posts.iter().map(PostCardView::from).collect(),
        pagination: page.window,
    }
}

fn parse_username(raw: &str) -> Result<Username, Error> {
    Username::new(raw).map_err(|_| Error::not_found("no such profile"))
}

/// First page of the home feed.
#[utoipa::path(
    get,
    path = "/api/v1/feed",
    responses((status = 200, description = "Newest posts", body = FeedView)),
    tags = ["feeds"],
    operation_id = "homeFeed",
    security([])
)]
#[get("/feed")]
pub async fn home(state: web::Data<HttpState>) -> ApiResult<web::Json<FeedView>> {
    let page = state.feeds.home(None).await?;
    Ok(web::Json(feed_view(page)))
}

/// A later page of the home feed.
#[utoipa::path(
    get,
    path = "/api/v1/feed/page/{page}",
    params(("page" = i64, Path, description = "1-indexed page number")),
    responses((status = 200, description = "Newest posts", body = FeedView)),
    tags = ["feeds"],
    operation_id = "homeFeedPage",
    security([])
)]
#[get("/feed/page/{page}")]
pub async fn home_page(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<FeedView>> {
    let page = state.feeds.home(Some(path.into_inner())).await?;
    Ok(web::Json(feed_view(page)))
}

/// First page of the signed-in user's reading list.
#[utoipa::path(
    get,
    path = "/api/v1/readinglist",
    responses(
        (status = 200, description = "Saved posts", body = FeedView),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["feeds"],
    operation_id = "readingList"
)]
#[get("/readinglist")]
pub async fn reading_list(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<FeedView>> {
    let acting = session.require_user_id()?;
    let page = state.feeds.reading_list(&acting, None).await?;
    Ok(web::Json(feed_view(page)))
}

/// A later page of the reading list.
#[utoipa::path(
    get,
    path = "/api/v1/readinglist/page/{page}",
    params(("page" = i64, Path, description = "1-indexed page number")),
    responses(
        (status = 200, description = "Saved posts", body = FeedView),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["feeds"],
    operation_id = "readingListPage"
)]
#[get("/readinglist/page/{page}")]
pub async fn reading_list_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<FeedView>> {
    let acting = session.require_user_id()?;
    let page = state.feeds.reading_list(&acting, Some(path.into_inner())).await?;
    Ok(web::Json(feed_view(page)))
}

/// A public profile with the first page of their posts.
#[utoipa::path(
    get,
    path = "/api/v1/profiles/{username}",
    params(("username" = String, Path, description = "Profile handle")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "Unknown profile", body = Error)
    ),
    tags = ["feeds"],
    operation_id = "profile",
    security([])
)]
#[get("/profiles/{username}")]
pub async fn profile(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let username = parse_username(&path)?;
    let view = state.feeds.profile(&username, None).await?;
    Ok(web::Json(ProfileResponse::from(view)))
}

/// A later page of a public profile.
#[utoipa::path(
    get,
    path = "/api/v1/profiles/{username}/page/{page}",
    params(
        ("username" = String, Path, description = "Profile handle"),
        ("page" = i64, Path, description = "1-indexed page number")
    ),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "Unknown profile", body = Error)
    ),
    tags = ["feeds"],
    operation_id = "profilePage",
    security([])
)]
#[get("/profiles/{username}/page/{page}")]
pub async fn profile_page(
    state: web::Data<HttpState>,
    path: web::Path<(String, i64)>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let (raw_username, page) = path.into_inner();
    let username = parse_username(&raw_username)?;
    let view = state.feeds.profile(&username, Some(page)).await?;
    Ok(web::Json(ProfileResponse::from(view)))
}

/// The signed-in user's dashboard.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Aggregates and owned posts", body = DashboardResponse),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["feeds"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardResponse>> {
    let acting = session.require_user_id()?;
    let view = state.feeds.dashboard(&acting).await?;
    Ok(web::Json(DashboardResponse::from(view)))
}

#[cfg(test)]
mod tests {
    use crate::inbound::http::test_utils::{create_post, signup_and_login, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;

    #[actix_web::test]
    async fn home_feed_lists_posts_with_authors_and_a_window() {
        let app = actix_test::init_service(test_app()).await;
        let cookie = signup_and_login(&app, "Author", "author@example.com").await;
        create_post(&app, &cookie, "First").await;
        create_post(&app, &cookie, "Second").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/feed").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        let posts = body["posts"].as_array().expect("posts array");
        assert_eq!(posts.len(), 2);
        // Newest first.
        assert_eq!(posts[0]["title"], "Second");
        assert_eq!(posts[0]["author"]["displayName"], "Author");
        assert_eq!(body["pagination"]["currentPage"], 1);
        assert_eq!(body["pagination"]["totalPages"], 1);
        assert!(body["pagination"]["next"].is_null());
    }

    #[actix_web::test]
    async fn reading_list_round_trip_over_http() {
        let app = actix_test::init_service(test_app()).await;
        let author_cookie = signup_and_login(&app, "Author", "author@example.com").await;
        let post_id = create_post(&app, &author_cookie, "Saved post").await;
        let reader_cookie = signup_and_login(&app, "Reader", "reader@example.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/posts/{post_id}/bookmark"))
                .cookie(reader_cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/readinglist")
                .cookie(reader_cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        let posts = body["posts"].as_array().expect("posts array");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["title"], "Saved post");
        assert_eq!(posts[0]["bookmarkCount"], 1);
    }

    #[actix_web::test]
    async fn profile_and_dashboard_reflect_engagement() {
        let app = actix_test::init_service(test_app()).await;
        let author_cookie = signup_and_login(&app, "Author", "author@example.com").await;
        let post_id = create_post(&app, &author_cookie, "Tracked post").await;

        // Find the author's generated username via settings.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/settings")
                .cookie(author_cookie.clone())
                .to_request(),
        )
        .await;
        let settings: Value = actix_test::read_body_json(res).await;
        let username = settings["username"].as_str().expect("username").to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/posts/{post_id}/visit"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/profiles/{username}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let profile: Value = actix_test::read_body_json(res).await;
        assert_eq!(profile["postsPublished"], 1);
        assert_eq!(profile["posts"].as_array().expect("posts").len(), 1);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/dashboard")
                .cookie(author_cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let dashboard: Value = actix_test::read_body_json(res).await;
        assert_eq!(dashboard["totalVisits"], 1);
        assert_eq!(dashboard["posts"][0]["visitCount"], 1);
    }

    #[actix_web::test]
    async fn unknown_profile_is_not_found() {
        let app = actix_test::init_service(test_app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/profiles/ghost-user")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
