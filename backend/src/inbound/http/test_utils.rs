//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};

use crate::domain::ports::FixtureImageHost;
use crate::domain::test_fixtures::plain_hasher;
use crate::outbound::persistence::{InMemoryPostStore, InMemoryUserStore};

use super::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Fresh handler state over empty in-memory stores, a plain test hasher, and
/// the fixture image host.
pub fn test_state() -> web::Data<HttpState> {
    web::Data::new(HttpState::assemble(
        Arc::new(InMemoryUserStore::default()),
        Arc::new(InMemoryPostStore::default()),
        plain_hasher(),
        Arc::new(FixtureImageHost),
    ))
}

/// The full API surface wired over [`test_state`].
pub fn test_app() -> App<
    impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
> {
    App::new()
        .app_data(test_state())
        .wrap(test_session_middleware())
        .service(web::scope("/api/v1").configure(super::configure_api))
}

/// Register an account with the standard test password and return a
/// signed-in session cookie.
pub async fn signup_and_login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
) -> Cookie<'static> {
    let register = actix_test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(json!({
            "name": name,
            "email": email,
            "password": "a long enough password",
        }))
        .to_request();
    let register_res = actix_test::call_service(app, register).await;
    assert!(register_res.status().is_success(), "registration failed");

    let login = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({
            "email": email,
            "password": "a long enough password",
        }))
        .to_request();
    let login_res = actix_test::call_service(app, login).await;
    assert!(login_res.status().is_success(), "login failed");
    login_res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Publish a post as the given session and return its id.
pub async fn create_post(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &Cookie<'static>,
    title: &str,
) -> String {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/posts")
        .cookie(cookie.clone())
        .set_json(json!({
            "title": title,
            "content": "a body with enough words to read",
            "banner": "YmFubmVyLWJ5dGVz",
        }))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert!(response.status().is_success(), "post creation failed");
    let body: Value = actix_test::read_body_json(response).await;
    body["id"].as_str().expect("post id").to_owned()
}
