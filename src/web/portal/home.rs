use askama::Template;
use axum::{
    extract::State,
    response::IntoResponse,
    Extension,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    error::Result,
    web::{page_context, templates::{HtmlTemplate, PageContext}},
};
use super::announcements::{announcement_infos, AnnouncementInfo};
use super::gallery::TemplateInfo;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub templates: Vec<TemplateInfo>,
    pub announcements: Vec<AnnouncementInfo>,
}

// GET /
pub async fn home_page(
    State(state): State<AppState>,
    current_user: Option<Extension<CurrentUser>>,
    jar: CookieJar,
) -> Result<impl IntoResponse> {
    let context = &state.service_context;

    let templates = context.template_service.featured().await?;
    let announcements = context.announcement_service.list_recent().await?;
    let announcements = announcement_infos(&state, announcements).await?;

    let (jar, ctx) = page_context(jar, current_user.as_deref().map(|c| &c.user));

    Ok((jar, HtmlTemplate(HomeTemplate {
        ctx,
        templates: templates.iter().map(TemplateInfo::from).collect(),
        announcements,
    })))
}
