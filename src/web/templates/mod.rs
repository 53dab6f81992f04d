pub mod auth;

use askama::Template;
use axum::{
    response::{Html, IntoResponse, Response},
    http::StatusCode,
};

use crate::domain::User;
use crate::web::flash::FlashMessage;

// Data every page template has access to
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub current_user: Option<UserInfo>,
    pub is_staff: bool,
    pub messages: Vec<FlashMessage>,
}

impl PageContext {
    pub fn new(user: Option<&User>, messages: Vec<FlashMessage>) -> Self {
        Self {
            current_user: user.map(UserInfo::from),
            is_staff: user.map(|u| u.is_staff()).unwrap_or(false),
            messages,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub display_name: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name(),
        }
    }
}

// Make askama templates work with axum
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!("Failed to render template: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to render template: {}", err),
                ).into_response()
            }
        }
    }
}
