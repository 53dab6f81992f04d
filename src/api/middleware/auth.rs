use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth::SESSION_COOKIE,
    domain::User,
    error::Result,
};

#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
}

/// Resolves the session cookie to a user. Missing, expired or orphaned
/// sessions yield `None`.
async fn resolve_user(state: &AppState, jar: &CookieJar) -> Result<Option<User>> {
    let Some(session_cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let context = &state.service_context;
    let Some(session) = context.auth_service.validate_session(session_cookie.value()).await? else {
        return Ok(None);
    };

    context.user_repo.find_by_id(session.user_id).await
}

/// Login URL that brings the user back to `path_and_query` afterwards.
pub fn login_redirect_target(path_and_query: &str) -> String {
    format!("/login?next={}", urlencoding::encode(path_and_query))
}

/// Lets the request through with a `CurrentUser` extension, or redirects
/// anonymous visitors to the login page.
pub async fn require_auth_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_user(&state, &jar).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(CurrentUser { user });
            next.run(request).await
        }
        Ok(None) => {
            let target = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            Redirect::to(&login_redirect_target(target)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Attaches `CurrentUser` when a valid session exists, never rejects.
pub async fn optional_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_user(&state, &jar).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(CurrentUser { user });
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Session lookup failed: {}", e),
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_keeps_query() {
        assert_eq!(
            login_redirect_target("/resume/3/edit?tab=1"),
            "/login?next=%2Fresume%2F3%2Fedit%3Ftab%3D1"
        );
    }
}
