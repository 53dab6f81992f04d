use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth::{AuthService, SESSION_COOKIE},
    error::Result,
    web::{
        flash::{self, FlashLevel},
        forms::FormErrors,
        page_context,
    },
};
use super::{HtmlTemplate, PageContext};

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub username: String,
    pub next: String,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: String,
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        "/"
    }
}

// GET /login
pub async fn login_page(
    current_user: Option<Extension<CurrentUser>>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    let (jar, ctx) = page_context(jar, current_user.as_deref().map(|c| &c.user));

    (jar, HtmlTemplate(LoginTemplate {
        ctx,
        username: String::new(),
        next: query.next.unwrap_or_default(),
        error: None,
    }))
}

// POST /login
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let context = &state.service_context;

    let authenticated = context.account_service
        .authenticate(form.username.trim(), &form.password)
        .await?;

    let Some(user) = authenticated else {
        tracing::info!("Failed login attempt for '{}'", form.username.trim());
        let (jar, ctx) = page_context(jar, None);
        return Ok((jar, HtmlTemplate(LoginTemplate {
            ctx,
            username: form.username,
            next: form.next,
            error: Some("Please enter a correct username and password.".to_string()),
        })).into_response());
    };

    let (_, token) = context.auth_service.create_session(user.id).await?;
    let jar = jar.add(context.auth_service.create_session_cookie(&token));

    tracing::info!("User {} logged in", user.id);

    Ok(flash::redirect_with(
        jar,
        FlashLevel::Success,
        format!("Welcome, {}! You are now logged in.", user.username),
        safe_next(&form.next),
    ).into_response())
}

#[derive(Template)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub username: String,
    pub errors: FormErrors,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 150, message = "Username must be between 1 and 150 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password1: String,
    pub password2: String,
}

// GET /register
pub async fn register_page(
    current_user: Option<Extension<CurrentUser>>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (jar, ctx) = page_context(jar, current_user.as_deref().map(|c| &c.user));

    (jar, HtmlTemplate(RegisterTemplate {
        ctx,
        username: String::new(),
        errors: FormErrors::default(),
    }))
}

// POST /register
pub async fn register_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let context = &state.service_context;

    let registered = match form.validate() {
        Err(errors) => Err(FormErrors::from_validation(&errors)),
        Ok(()) => match context.account_service
            .register(&form.username, &form.password1, &form.password2)
            .await
        {
            Ok(user) => Ok(user),
            Err(err) => Err(FormErrors::from_app_error(err)?),
        },
    };

    let user = match registered {
        Ok(user) => user,
        Err(errors) => {
            let (jar, ctx) = page_context(jar, None);
            return Ok((jar, HtmlTemplate(RegisterTemplate {
                ctx,
                username: form.username,
                errors,
            })).into_response());
        }
    };

    let (_, token) = context.auth_service.create_session(user.id).await?;
    let jar = jar.add(context.auth_service.create_session_cookie(&token));

    Ok(flash::redirect_with(
        jar,
        FlashLevel::Success,
        format!("Welcome, {}! Your account has been created.", user.username),
        "/",
    ).into_response())
}

// GET or POST /logout
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        state.service_context.auth_service
            .invalidate_session(session_cookie.value())
            .await?;
    }

    let jar = jar.add(AuthService::create_logout_cookie());
    Ok(flash::redirect_with(jar, FlashLevel::Info, "You have been logged out.", "/"))
}
