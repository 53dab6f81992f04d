use std::collections::HashMap;

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Extension, Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Announcement, AnnouncementInput},
    error::Result,
    service::access::ensure_staff,
    web::{
        flash::{self, FlashLevel},
        forms::FormErrors,
        page_context,
        templates::{HtmlTemplate, PageContext},
    },
};

pub struct AnnouncementInfo {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: String,
}

/// Resolves author names for display. Authors are looked up once each.
pub async fn announcement_infos(
    state: &AppState,
    announcements: Vec<Announcement>,
) -> Result<Vec<AnnouncementInfo>> {
    let mut authors: HashMap<i64, String> = HashMap::new();
    let mut infos = Vec::with_capacity(announcements.len());

    for announcement in announcements {
        if !authors.contains_key(&announcement.author_id) {
            let name = state.service_context.user_repo
                .find_by_id(announcement.author_id)
                .await?
                .map(|u| u.display_name())
                .unwrap_or_else(|| "Unknown".to_string());
            authors.insert(announcement.author_id, name);
        }

        infos.push(AnnouncementInfo {
            id: announcement.id,
            author: authors.get(&announcement.author_id).cloned().unwrap_or_default(),
            created_at: announcement.created_at.format("%B %d, %Y").to_string(),
            title: announcement.title,
            content: announcement.content,
        });
    }

    Ok(infos)
}

#[derive(Template)]
#[template(path = "announcements/list.html")]
pub struct AnnouncementsTemplate {
    pub ctx: PageContext,
    pub announcements: Vec<AnnouncementInfo>,
}

// GET /announcements
pub async fn announcements_page(
    State(state): State<AppState>,
    current_user: Option<Extension<CurrentUser>>,
    jar: CookieJar,
) -> Result<impl IntoResponse> {
    let announcements = state.service_context.announcement_service.list().await?;
    let announcements = announcement_infos(&state, announcements).await?;

    let (jar, ctx) = page_context(jar, current_user.as_deref().map(|c| &c.user));

    Ok((jar, HtmlTemplate(AnnouncementsTemplate { ctx, announcements })))
}

#[derive(Template)]
#[template(path = "announcements/form.html")]
pub struct AnnouncementFormTemplate {
    pub ctx: PageContext,
    /// `None` when creating.
    pub announcement_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub errors: FormErrors,
}

#[derive(Debug, Deserialize)]
pub struct AnnouncementForm {
    pub title: String,
    pub content: String,
}

impl From<AnnouncementForm> for AnnouncementInput {
    fn from(form: AnnouncementForm) -> Self {
        Self {
            title: form.title.trim().to_string(),
            content: form.content.trim_end().to_string(),
        }
    }
}

fn form_page(
    jar: CookieJar,
    current_user: &CurrentUser,
    announcement_id: Option<i64>,
    input: AnnouncementInput,
    errors: FormErrors,
) -> Response {
    let (jar, ctx) = page_context(jar, Some(&current_user.user));

    (jar, HtmlTemplate(AnnouncementFormTemplate {
        ctx,
        announcement_id,
        title: input.title,
        content: input.content,
        errors,
    })).into_response()
}

// GET /announcement/create
pub async fn new_announcement_page(
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response> {
    ensure_staff(&current_user.user)?;

    let empty = AnnouncementInput { title: String::new(), content: String::new() };
    Ok(form_page(jar, &current_user, None, empty, FormErrors::default()))
}

// POST /announcement/create
pub async fn create_announcement(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<AnnouncementForm>,
) -> Result<Response> {
    ensure_staff(&current_user.user)?;
    let input = AnnouncementInput::from(form);

    if let Err(errors) = input.validate() {
        let errors = FormErrors::from_validation(&errors);
        return Ok(form_page(jar, &current_user, None, input, errors));
    }

    match state.service_context.announcement_service
        .create(&current_user.user, input.clone())
        .await
    {
        Ok(_) => Ok(flash::redirect_with(
            jar,
            FlashLevel::Success,
            "Announcement created!",
            "/announcements",
        ).into_response()),
        Err(err) => {
            let errors = FormErrors::from_app_error(err)?;
            Ok(form_page(jar, &current_user, None, input, errors))
        }
    }
}

// GET /announcement/:id/edit
pub async fn edit_announcement_page(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response> {
    let announcement = state.service_context.announcement_service
        .get_for_edit(&current_user.user, id)
        .await?;

    let input = AnnouncementInput {
        title: announcement.title,
        content: announcement.content,
    };
    Ok(form_page(jar, &current_user, Some(announcement.id), input, FormErrors::default()))
}

// POST /announcement/:id/edit
pub async fn update_announcement(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
    Form(form): Form<AnnouncementForm>,
) -> Result<Response> {
    let service = &state.service_context.announcement_service;
    // Resolves existence and staff rights before looking at the input
    service.get_for_edit(&current_user.user, id).await?;

    let input = AnnouncementInput::from(form);
    if let Err(errors) = input.validate() {
        let errors = FormErrors::from_validation(&errors);
        return Ok(form_page(jar, &current_user, Some(id), input, errors));
    }

    match service.update(&current_user.user, id, input.clone()).await {
        Ok(_) => Ok(flash::redirect_with(
            jar,
            FlashLevel::Success,
            "Announcement updated!",
            "/announcements",
        ).into_response()),
        Err(err) => {
            let errors = FormErrors::from_app_error(err)?;
            Ok(form_page(jar, &current_user, Some(id), input, errors))
        }
    }
}

#[derive(Template)]
#[template(path = "announcements/delete.html")]
pub struct DeleteAnnouncementTemplate {
    pub ctx: PageContext,
    pub id: i64,
    pub title: String,
}

// GET /announcement/:id/delete
pub async fn delete_announcement_page(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let announcement = state.service_context.announcement_service
        .get_for_edit(&current_user.user, id)
        .await?;

    let (jar, ctx) = page_context(jar, Some(&current_user.user));

    Ok((jar, HtmlTemplate(DeleteAnnouncementTemplate {
        ctx,
        id: announcement.id,
        title: announcement.title,
    })))
}

// POST /announcement/:id/delete
pub async fn delete_announcement(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.service_context.announcement_service
        .delete(&current_user.user, id)
        .await?;

    Ok(flash::redirect_with(jar, FlashLevel::Success, "Announcement deleted!", "/announcements"))
}
