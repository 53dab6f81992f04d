pub mod flash;
pub mod forms;
pub mod portal;
pub mod templates;
pub mod uploads;

use axum::{
    Router,
    middleware,
    routing::get,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::{middleware::auth::optional_auth, state::AppState},
    domain::User,
};
use templates::PageContext;

pub fn create_web_routes(state: AppState) -> Router {
    Router::new()
        // Pages anyone can see; the session is still read for the nav bar
        .route("/", get(portal::home::home_page))
        .route(
            "/login",
            get(templates::auth::login_page).post(templates::auth::login_handler),
        )
        .route(
            "/register",
            get(templates::auth::register_page).post(templates::auth::register_handler),
        )
        .route(
            "/logout",
            get(templates::auth::logout_handler).post(templates::auth::logout_handler),
        )
        .route("/templates", get(portal::gallery::gallery_page))
        .route("/announcements", get(portal::announcements::announcements_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth))

        // Member pages
        .merge(portal::create_portal_routes(state.clone()))

        .with_state(state)
}

/// Builds the shared page context, consuming pending flash messages.
pub fn page_context(jar: CookieJar, user: Option<&User>) -> (CookieJar, PageContext) {
    let (jar, messages) = flash::take(jar);
    (jar, PageContext::new(user, messages))
}
