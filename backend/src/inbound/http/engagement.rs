//! Engagement API handlers: reactions, reading list, visits.
//!
//! ```text
//! PUT    /api/v1/posts/{post_id}/reaction
//! DELETE /api/v1/posts/{post_id}/reaction
//! PUT    /api/v1/posts/{post_id}/bookmark
//! DELETE /api/v1/posts/{post_id}/bookmark
//! POST   /api/v1/posts/{post_id}/visit
//! ```
//!
//! Reactions and bookmarks need a signed-in user; visit recording is open to
//! anyone (client-side deduplication only).

use actix_web::{HttpResponse, delete, post, put, web};

use crate::domain::ports::EngagementCommand as _;
use crate::inbound::http::ApiResult;
use crate::inbound::http::posts::parse_post_id;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// React to a post.
#[utoipa::path(
    put,
    path = "/api/v1/posts/{post_id}/reaction",
    params(("post_id" = String, Path, description = "Post identifier")),
    responses(
        (status = 204, description = "Reaction recorded"),
        (status = 400, description = "Already reacted", body = crate::domain::Error),
        (status = 401, description = "Not signed in", body = crate::domain::Error),
        (status = 404, description = "Unknown post", body = crate::domain::Error)
    ),
    tags = ["engagement"],
    operation_id = "addReaction"
)]
#[put("/posts/{post_id}/reaction")]
pub async fn add_reaction(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let acting = session.require_user_id()?;
    let post_id = parse_post_id(&path)?;
    state.engagement.add_reaction(&acting, &post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Withdraw a reaction.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{post_id}/reaction",
    params(("post_id" = String, Path, description = "Post identifier")),
    responses(
        (status = 204, description = "Reaction withdrawn"),
        (status = 400, description = "Not reacted", body = crate::domain::Error),
        (status = 401, description = "Not signed in", body = crate::domain::Error),
        (status = 404, description = "Unknown post", body = crate::domain::Error)
    ),
    tags = ["engagement"],
    operation_id = "removeReaction"
)]
#[delete("/posts/{post_id}/reaction")]
pub async fn remove_reaction(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let acting = session.require_user_id()?;
    let post_id = parse_post_id(&path)?;
    state.engagement.remove_reaction(&acting, &post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Put a post on the reading list.
#[utoipa::path(
    put,
    path = "/api/v1/posts/{post_id}/bookmark",
    params(("post_id" = String, Path, description = "Post identifier")),
    responses(
        (status = 204, description = "Saved to the reading list"),
        (status = 400, description = "Already saved", body = crate::domain::Error),
        (status = 401, description = "Not signed in", body = crate::domain::Error),
        (status = 404, description = "Unknown post", body = crate::domain::Error)
    ),
    tags = ["engagement"],
    operation_id = "addBookmark"
)]
#[put("/posts/{post_id}/bookmark")]
pub async fn add_bookmark(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let acting = session.require_user_id()?;
    let post_id = parse_post_id(&path)?;
    state
        .engagement
        .add_to_reading_list(&acting, &post_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Take a post off the reading list.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{post_id}/bookmark",
    params(("post_id" = String, Path, description = "Post identifier")),
    responses(
        (status = 204, description = "Removed from the reading list"),
        (status = 400, description = "Not on the reading list", body = crate::domain::Error),
        (status = 401, description = "Not signed in", body = crate::domain::Error)
    ),
    tags = ["engagement"],
    operation_id = "removeBookmark"
)]
#[delete("/posts/{post_id}/bookmark")]
pub async fn remove_bookmark(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let acting = session.require_user_id()?;
    let post_id = parse_post_id(&path)?;
    state
        .engagement
        .remove_from_reading_list(&acting, &post_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Record one view of a post.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{post_id}/visit",
    params(("post_id" = String, Path, description = "Post identifier")),
    responses(
        (status = 204, description = "Visit recorded"),
        (status = 404, description = "Unknown post", body = crate::domain::Error)
    ),
    tags = ["engagement"],
    operation_id = "recordVisit",
    security([])
)]
#[post("/posts/{post_id}/visit")]
pub async fn record_visit(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;
    state.engagement.record_visit(&post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use crate::inbound::http::test_utils::{create_post, signup_and_login, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;

    #[actix_web::test]
    async fn reaction_lifecycle_over_http() {
        let app = actix_test::init_service(test_app()).await;
        let author_cookie = signup_and_login(&app, "Author", "author@example.com").await;
        let post_id = create_post(&app, &author_cookie, "Reacted post").await;
        let reader_cookie = signup_and_login(&app, "Reader", "reader@example.com").await;

        let uri = format!("/api/v1/posts/{post_id}/reaction");
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&uri)
                .cookie(reader_cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        // A second reaction from the same reader is a 400.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&uri)
                .cookie(reader_cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        // The counter moved exactly once, and the detail shows the viewer's
        // reaction state.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/posts/{post_id}"))
                .cookie(reader_cookie.clone())
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["reactionCount"], 1);
        assert_eq!(body["viewer"]["reacted"], true);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&uri)
                .cookie(reader_cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn engagement_requires_a_session_but_visits_do_not() {
        let app = actix_test::init_service(test_app()).await;
        let author_cookie = signup_and_login(&app, "Author", "author@example.com").await;
        let post_id = create_post(&app, &author_cookie, "Visited post").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/posts/{post_id}/reaction"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        for _ in 0..2 {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri(&format!("/api/v1/posts/{post_id}/visit"))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::NO_CONTENT);
        }

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/posts/{post_id}"))
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["visitCount"], 2);
    }
}
