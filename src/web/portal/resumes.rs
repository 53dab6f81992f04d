use std::collections::HashMap;

use askama::Template;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use axum_extra::extract::CookieJar;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreateResumeRequest, Resume, ResumeSection, ResumeTemplate, ResumeWithSections},
    error::Result,
    web::{
        flash::{self, FlashLevel, FlashMessage},
        forms::{FormErrors, MultipartForm},
        page_context,
        templates::{HtmlTemplate, PageContext},
        uploads::{self, RESUME_PHOTOS_DIR},
    },
};

/// Form field prefix carrying a section's new content in a bulk save.
pub const SECTION_CONTENT_PREFIX: &str = "section_content_";

pub struct ResumeInfo {
    pub id: i64,
    pub title: String,
    pub template_name: Option<String>,
    pub photo_url: Option<String>,
    pub updated_at: String,
}

impl ResumeInfo {
    pub fn new(resume: &Resume, templates: &HashMap<i64, String>) -> Self {
        Self {
            id: resume.id,
            title: resume.title.clone(),
            template_name: resume.template_id.and_then(|id| templates.get(&id).cloned()),
            photo_url: resume.photo.as_ref().map(|p| format!("/media/{}", p)),
            updated_at: resume.updated_at.format("%B %d, %Y %H:%M").to_string(),
        }
    }
}

pub struct SectionInfo {
    pub id: i64,
    pub title: String,
    pub content: String,
}

impl From<&ResumeSection> for SectionInfo {
    fn from(section: &ResumeSection) -> Self {
        Self {
            id: section.id,
            title: section.title.clone(),
            content: section.content.clone(),
        }
    }
}

pub struct TemplateOption {
    pub id: i64,
    pub name: String,
    pub selected: bool,
}

pub(super) async fn template_names(state: &AppState) -> Result<HashMap<i64, String>> {
    let templates = state.service_context.template_service.list().await?;
    Ok(templates.into_iter().map(|t| (t.id, t.name)).collect())
}

fn template_options(templates: &[ResumeTemplate], selected: Option<i64>) -> Vec<TemplateOption> {
    templates
        .iter()
        .map(|t| TemplateOption {
            id: t.id,
            name: t.name.clone(),
            selected: Some(t.id) == selected,
        })
        .collect()
}

/// Pulls `section_content_<id>` fields out of a submitted edit form.
/// Fields whose id does not parse are dropped.
pub fn section_contents(form: &HashMap<String, String>) -> HashMap<i64, String> {
    form.iter()
        .filter_map(|(key, value)| {
            let id = key.strip_prefix(SECTION_CONTENT_PREFIX)?.parse::<i64>().ok()?;
            Some((id, value.clone()))
        })
        .collect()
}

#[derive(Template)]
#[template(path = "resumes/list.html")]
pub struct ResumeListTemplate {
    pub ctx: PageContext,
    pub resumes: Vec<ResumeInfo>,
}

// GET /resumes
pub async fn resume_list_page(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<impl IntoResponse> {
    let resumes = state.service_context.resume_service
        .list_resumes(&current_user.user)
        .await?;
    let names = template_names(&state).await?;

    let (jar, ctx) = page_context(jar, Some(&current_user.user));

    Ok((jar, HtmlTemplate(ResumeListTemplate {
        ctx,
        resumes: resumes.iter().map(|r| ResumeInfo::new(r, &names)).collect(),
    })))
}

#[derive(Template)]
#[template(path = "resumes/create.html")]
pub struct CreateResumeTemplate {
    pub ctx: PageContext,
    pub title: String,
    pub templates: Vec<TemplateOption>,
    pub errors: FormErrors,
}

async fn create_form(
    state: &AppState,
    jar: CookieJar,
    current_user: &CurrentUser,
    title: String,
    selected: Option<i64>,
    errors: FormErrors,
) -> Result<Response> {
    let templates = state.service_context.template_service.list().await?;
    let (jar, ctx) = page_context(jar, Some(&current_user.user));

    Ok((jar, HtmlTemplate(CreateResumeTemplate {
        ctx,
        title,
        templates: template_options(&templates, selected),
        errors,
    })).into_response())
}

// GET /resume/create
pub async fn create_resume_page(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response> {
    create_form(&state, jar, &current_user, String::new(), None, FormErrors::default()).await
}

// POST /resume/create
pub async fn create_resume(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response> {
    let mut form = MultipartForm::read(multipart).await?;
    let title = form.text("title").trim().to_string();
    let photo = form.take_file("photo");

    let mut errors = FormErrors::default();

    let template_field = form.text("template");
    let template_id = match template_field.trim() {
        "" => None,
        raw => match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("template", "Select a valid template");
                None
            }
        },
    };

    let mut request = CreateResumeRequest { title: title.clone(), template_id, photo: None };
    if let Err(validation) = request.validate() {
        errors.merge(FormErrors::from_validation(&validation));
    }

    let media = &state.settings.media;
    if let Some(image) = &photo {
        if let Err(err) = uploads::validate_image(image, media.max_upload_bytes) {
            errors.add_app_error("photo", err)?;
        }
    }

    if !errors.is_empty() {
        return create_form(&state, jar, &current_user, title, template_id, errors).await;
    }

    if let Some(image) = &photo {
        let path = uploads::save_uploaded_image(
            &media.root_path(),
            RESUME_PHOTOS_DIR,
            image,
            media.max_upload_bytes,
        ).await?;
        request.photo = Some(path);
    }
    let saved_photo = request.photo.clone();

    match state.service_context.resume_service.create_resume(&current_user.user, request).await {
        Ok(resume) => Ok(flash::redirect_with(
            jar,
            FlashLevel::Success,
            "Resume created successfully!",
            &format!("/resume/{}/edit", resume.id),
        ).into_response()),
        Err(err) => {
            if let Some(path) = saved_photo {
                if let Err(cleanup) = uploads::delete_uploaded_file(&media.root_path(), &path).await {
                    tracing::warn!("Failed to remove orphaned photo {}: {}", path, cleanup);
                }
            }
            let errors = FormErrors::from_app_error(err)?;
            create_form(&state, jar, &current_user, title, template_id, errors).await
        }
    }
}

#[derive(Template)]
#[template(path = "resumes/edit.html")]
pub struct EditResumeTemplate {
    pub ctx: PageContext,
    pub resume: ResumeInfo,
    pub sections: Vec<SectionInfo>,
    pub new_section_title: String,
    pub new_section_content: String,
}

async fn edit_page(
    state: &AppState,
    current_user: &CurrentUser,
    resume_id: i64,
    ctx: PageContext,
    new_section: (String, String),
) -> Result<EditResumeTemplate> {
    let ResumeWithSections { resume, sections } = state.service_context.resume_service
        .get_resume(&current_user.user, resume_id)
        .await?;
    let names = template_names(state).await?;

    Ok(EditResumeTemplate {
        ctx,
        resume: ResumeInfo::new(&resume, &names),
        sections: sections.iter().map(SectionInfo::from).collect(),
        new_section_title: new_section.0,
        new_section_content: new_section.1,
    })
}

// GET /resume/:id/edit
pub async fn edit_resume_page(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let (jar, ctx) = page_context(jar, Some(&current_user.user));
    let page = edit_page(&state, &current_user, id, ctx, Default::default()).await?;

    Ok((jar, HtmlTemplate(page)))
}

// POST /resume/:id/edit
pub async fn edit_resume(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response> {
    let service = &state.service_context.resume_service;
    let edit_url = format!("/resume/{}/edit", id);

    if form.contains_key("save_sections") {
        let updated = service
            .save_sections(&current_user.user, id, &section_contents(&form))
            .await?;
        tracing::debug!("Saved {} sections of resume {}", updated, id);

        return Ok(flash::redirect_with(jar, FlashLevel::Success, "Changes saved!", &edit_url)
            .into_response());
    }

    if form.contains_key("add_section") {
        let title = form.get("section_title").cloned().unwrap_or_default();
        let content = form.get("section_content").cloned().unwrap_or_default();

        let added = match service.add_section(&current_user.user, id, &title, &content).await {
            Ok(added) => added,
            Err(err) => {
                let errors = FormErrors::from_app_error(err)?;
                let (jar, mut ctx) = page_context(jar, Some(&current_user.user));
                ctx.messages.extend(
                    errors
                        .general_errors()
                        .iter()
                        .map(|text| FlashMessage { level: FlashLevel::Error, text: text.clone() }),
                );
                let page = edit_page(&state, &current_user, id, ctx, (title, content)).await?;
                return Ok((jar, HtmlTemplate(page)).into_response());
            }
        };

        if added.is_some() {
            return Ok(flash::redirect_with(jar, FlashLevel::Success, "Section added!", &edit_url)
                .into_response());
        }

        // Nothing to add; show the page again as it was submitted
        let (jar, ctx) = page_context(jar, Some(&current_user.user));
        let page = edit_page(&state, &current_user, id, ctx, (title, content)).await?;
        return Ok((jar, HtmlTemplate(page)).into_response());
    }

    // Still resolve the résumé so foreign ids get the usual error
    service.owned_resume(&current_user.user, id).await?;
    Ok(Redirect::to(&edit_url).into_response())
}

#[derive(Template)]
#[template(path = "resumes/view.html")]
pub struct ViewResumeTemplate {
    pub ctx: PageContext,
    pub resume: ResumeInfo,
    pub sections: Vec<SectionInfo>,
}

// GET /resume/:id/view
pub async fn view_resume_page(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let (jar, ctx) = page_context(jar, Some(&current_user.user));
    let page = edit_page(&state, &current_user, id, ctx, Default::default()).await?;

    Ok((jar, HtmlTemplate(ViewResumeTemplate {
        ctx: page.ctx,
        resume: page.resume,
        sections: page.sections,
    })))
}

#[derive(Template)]
#[template(path = "resumes/delete.html")]
pub struct DeleteResumeTemplate {
    pub ctx: PageContext,
    pub id: i64,
    pub title: String,
}

// GET /resume/:id/delete
pub async fn delete_resume_page(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let resume = state.service_context.resume_service
        .owned_resume(&current_user.user, id)
        .await?;
    let (jar, ctx) = page_context(jar, Some(&current_user.user));

    Ok((jar, HtmlTemplate(DeleteResumeTemplate {
        ctx,
        id: resume.id,
        title: resume.title,
    })))
}

// POST /resume/:id/delete
pub async fn delete_resume(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.service_context.resume_service
        .delete_resume(&current_user.user, id)
        .await?;

    Ok(flash::redirect_with(jar, FlashLevel::Success, "Resume deleted successfully!", "/resumes"))
}

// POST /resume/:id/clone
pub async fn clone_resume(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let cloned = state.service_context.resume_service
        .clone_resume(&current_user.user, id)
        .await?;

    Ok(flash::redirect_with(
        jar,
        FlashLevel::Success,
        "Resume cloned successfully!",
        &format!("/resume/{}/edit", cloned.id),
    ))
}
