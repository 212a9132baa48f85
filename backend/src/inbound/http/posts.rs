//! Post API handlers: create, read, edit, delete.
//!
//! ```text
//! POST   /api/v1/posts
//! GET    /api/v1/posts/{post_id}
//! PUT    /api/v1/posts/{post_id}
//! DELETE /api/v1/posts/{post_id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{NewPost, PostCommand as _, PostPatch, PostQuery as _};
use crate::domain::{Error, PostId, Title};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::{AuthorView, PostCardView, PostView};

/// Create-post request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    /// Raw markdown body.
    pub content: String,
    /// Base64 banner payload.
    pub banner: String,
}

/// Edit-post request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: String,
    /// Replacement banner payload, when the banner changed.
    #[serde(default)]
    pub banner: Option<String>,
}

/// Viewer engagement flags on a post detail.
#[derive(Debug, Clone, Copy, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewerView {
    pub reacted: bool,
    pub saved: bool,
}

/// Post detail response body.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailView {
    #[serde(flatten)]
    pub post: PostView,
    pub author: AuthorView,
    /// Up to three more posts from the same author.
    pub more_from_author: Vec<PostCardView>,
    /// Present only when a viewer is signed in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer: Option<ViewerView>,
}

/// Parse a path segment into a [`PostId`], treating malformed ids as unknown
/// posts.
pub(crate) fn parse_post_id(raw: &str) -> Result<PostId, Error> {
    PostId::new(raw).map_err(|_| Error::not_found("no such post"))
}

fn parse_title(raw: &str) -> Result<Title, Error> {
    Title::new(raw).map_err(|err| Error::invalid_request(err.to_string()))
}

/// Publish a new post.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post published", body = PostView),
        (status = 400, description = "Invalid post", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePostRequest>,
) -> ApiResult<HttpResponse> {
    let acting = session.require_user_id()?;
    let payload = payload.into_inner();
    let draft = NewPost {
        title: parse_title(&payload.title)?,
        content: payload.content,
        banner_base64: payload.banner,
    };
    let post = state.posts.create(&acting, draft).await?;
    Ok(HttpResponse::Created()
        .insert_header(("Location", format!("/api/v1/posts/{}", post.id)))
        .json(PostView::from(&post)))
}

/// Read a post with author, related posts, and viewer state.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}",
    params(("post_id" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Post detail", body = PostDetailView),
        (status = 404, description = "Unknown post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "getPost",
    security([])
)]
#[get("/posts/{post_id}")]
pub async fn post_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<PostDetailView>> {
    let post_id = parse_post_id(&path)?;
    let viewer = session.user_id()?;
    let detail = state.post_query.detail(viewer.as_ref(), &post_id).await?;

    let author = AuthorView::from(&detail.author);
    let more_from_author = detail
        .more_from_author
        .iter()
        .map(|post| PostCardView::new(post, author.clone()))
        .collect();
    Ok(web::Json(PostDetailView {
        post: PostView::from(&detail.post),
        author,
        more_from_author,
        viewer: detail.viewer.map(|flags| ViewerView {
            reacted: flags.reacted,
            saved: flags.saved,
        }),
    }))
}

/// Edit a post's content fields.
#[utoipa::path(
    put,
    path = "/api/v1/posts/{post_id}",
    params(("post_id" = String, Path, description = "Post identifier")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated post", body = PostView),
        (status = 400, description = "Invalid edit", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "updatePost"
)]
#[put("/posts/{post_id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdatePostRequest>,
) -> ApiResult<web::Json<PostView>> {
    let acting = session.require_user_id()?;
    let post_id = parse_post_id(&path)?;
    let payload = payload.into_inner();
    let patch = PostPatch {
        title: parse_title(&payload.title)?,
        content: payload.content,
        banner_base64: payload.banner,
    };
    let post = state.posts.update(&acting, &post_id, patch).await?;
    Ok(web::Json(PostView::from(&post)))
}

/// Delete a post, reconciling the author's aggregates.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{post_id}",
    params(("post_id" = String, Path, description = "Post identifier")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{post_id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let acting = session.require_user_id()?;
    let post_id = parse_post_id(&path)?;
    state.posts.delete(&acting, &post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{create_post, signup_and_login, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;

    #[actix_web::test]
    async fn create_then_read_a_post() {
        let app = actix_test::init_service(test_app()).await;
        let cookie = signup_and_login(&app, "Author", "author@example.com").await;
        let post_id = create_post(&app, &cookie, "Hello world").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/posts/{post_id}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["title"], "Hello world");
        assert_eq!(body["reactionCount"], 0);
        assert_eq!(body["author"]["displayName"], "Author");
        // Anonymous read: no viewer block.
        assert!(body.get("viewer").is_none());
    }

    #[actix_web::test]
    async fn creating_a_post_requires_a_session() {
        let app = actix_test::init_service(test_app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/posts")
                .set_json(&CreatePostRequest {
                    title: "Nope".into(),
                    content: "body".into(),
                    banner: "aW1n".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn malformed_and_unknown_ids_are_not_found() {
        let app = actix_test::init_service(test_app()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/posts/not-a-uuid")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/posts/3fa85f64-5717-4562-b3fc-2c963f66afa6")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn only_the_author_may_delete_via_http() {
        let app = actix_test::init_service(test_app()).await;
        let author_cookie = signup_and_login(&app, "Author", "author@example.com").await;
        let post_id = create_post(&app, &author_cookie, "Mine").await;
        let intruder_cookie = signup_and_login(&app, "Intruder", "intruder@example.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/posts/{post_id}"))
                .cookie(intruder_cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/posts/{post_id}"))
                .cookie(author_cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn edits_come_back_with_updated_content() {
        let app = actix_test::init_service(test_app()).await;
        let cookie = signup_and_login(&app, "Author", "author@example.com").await;
        let post_id = create_post(&app, &cookie, "Draft title").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/posts/{post_id}"))
                .cookie(cookie)
                .set_json(&UpdatePostRequest {
                    title: "Final title".into(),
                    content: "reworked body".into(),
                    banner: None,
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["title"], "Final title");
        assert_eq!(body["content"], "reworked body");
    }
}
