//! Backend entry-point: wires stores, services, middleware, and the REST API.

use std::env;
use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::{App, HttpServer, web};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;

use backend::RequestTrace;
use backend::domain::ports::{FixtureImageHost, ImageHost};
use backend::inbound::http::configure_api;
use backend::inbound::http::state::HttpState;
use backend::outbound::image::HttpImageHost;
use backend::outbound::persistence::{InMemoryPostStore, InMemoryUserStore};
use backend::outbound::security::Argon2PasswordHasher;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let key = load_session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);

    let state = web::Data::new(HttpState::assemble(
        Arc::new(InMemoryUserStore::default()),
        Arc::new(InMemoryPostStore::default()),
        Arc::new(Argon2PasswordHasher),
        image_host_from_env(),
    ));

    HttpServer::new(move || build_app(state.clone(), key.clone(), cookie_secure))
        .bind(("0.0.0.0", 8080))?
        .run()
        .await
}

/// Read the session signing key, falling back to an ephemeral key in dev.
fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".to_owned());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

/// Pick the image-host adapter from the environment.
fn image_host_from_env() -> Arc<dyn ImageHost> {
    match (
        env::var("IMAGE_HOST_UPLOAD_URL"),
        env::var("IMAGE_HOST_API_KEY"),
    ) {
        (Ok(url), Ok(api_key)) => Arc::new(HttpImageHost::new(url, api_key)),
        _ => {
            warn!("no image host configured; uploads resolve to fixture URLs");
            Arc::new(FixtureImageHost)
        }
    }
}

fn build_app(
    state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
) -> App<
    impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build();

    let api = web::scope("/api/v1").wrap(session).configure(configure_api);

    let app = App::new().app_data(state).wrap(RequestTrace).service(api);

    #[cfg(debug_assertions)]
    let app = app.service(openapi_json);

    app
}

/// Serve the OpenAPI document for local tooling.
#[cfg(debug_assertions)]
#[actix_web::get("/api-docs/openapi.json")]
async fn openapi_json() -> web::Json<utoipa::openapi::OpenApi> {
    web::Json(backend::ApiDoc::openapi())
}
