//! HTTP inbound adapter exposing the REST endpoints.

pub mod accounts;
pub mod engagement;
pub mod error;
pub mod feeds;
pub mod posts;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod views;

pub use error::ApiResult;

use actix_web::web;

/// Register every API handler on the given config.
///
/// Callers mount this under their scope of choice (the server uses
/// `/api/v1`) with a session middleware wrapped around it.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(accounts::register)
        .service(accounts::login)
        .service(accounts::logout)
        .service(accounts::settings)
        .service(accounts::update_profile)
        .service(accounts::change_password)
        .service(accounts::delete_account)
        .service(posts::create_post)
        .service(posts::post_detail)
        .service(posts::update_post)
        .service(posts::delete_post)
        .service(engagement::add_reaction)
        .service(engagement::remove_reaction)
        .service(engagement::add_bookmark)
        .service(engagement::remove_bookmark)
        .service(engagement::record_visit)
        .service(feeds::home)
        .service(feeds::home_page)
        .service(feeds::reading_list)
        .service(feeds::reading_list_page)
        .service(feeds::profile)
        .service(feeds::profile_page)
        .service(feeds::dashboard);
}
