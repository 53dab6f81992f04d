use askama::Template;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::CookieJar;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreateResumeTemplateRequest, ResumeTemplate},
    error::Result,
    service::access::ensure_staff,
    web::{
        flash::{self, FlashLevel},
        forms::{FormErrors, MultipartForm},
        page_context,
        templates::{HtmlTemplate, PageContext},
        uploads::{self, TEMPLATE_PREVIEWS_DIR},
    },
};

#[derive(Clone)]
pub struct TemplateInfo {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub preview_url: String,
}

impl From<&ResumeTemplate> for TemplateInfo {
    fn from(template: &ResumeTemplate) -> Self {
        Self {
            id: template.id,
            name: template.name.clone(),
            description: template.description.clone(),
            preview_url: format!("/media/{}", template.preview_image),
        }
    }
}

#[derive(Template)]
#[template(path = "templates/gallery.html")]
pub struct GalleryTemplate {
    pub ctx: PageContext,
    pub templates: Vec<TemplateInfo>,
}

// GET /templates
pub async fn gallery_page(
    State(state): State<AppState>,
    current_user: Option<Extension<CurrentUser>>,
    jar: CookieJar,
) -> Result<impl IntoResponse> {
    let templates = state.service_context.template_service.list().await?;
    let (jar, ctx) = page_context(jar, current_user.as_deref().map(|c| &c.user));

    Ok((jar, HtmlTemplate(GalleryTemplate {
        ctx,
        templates: templates.iter().map(TemplateInfo::from).collect(),
    })))
}

#[derive(Template)]
#[template(path = "templates/new.html")]
pub struct NewTemplateTemplate {
    pub ctx: PageContext,
    pub name: String,
    pub description: String,
    pub errors: FormErrors,
}

fn new_template_form(
    jar: CookieJar,
    current_user: &CurrentUser,
    name: String,
    description: String,
    errors: FormErrors,
) -> Response {
    let (jar, ctx) = page_context(jar, Some(&current_user.user));
    (jar, HtmlTemplate(NewTemplateTemplate { ctx, name, description, errors })).into_response()
}

// GET /templates/new
pub async fn new_template_page(
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response> {
    ensure_staff(&current_user.user)?;
    Ok(new_template_form(jar, &current_user, String::new(), String::new(), FormErrors::default()))
}

// POST /templates/new
pub async fn create_template(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response> {
    ensure_staff(&current_user.user)?;

    let mut form = MultipartForm::read(multipart).await?;
    let name = form.text("name").trim().to_string();
    let description = form.text("description").trim().to_string();
    let preview = form.take_file("preview_image");

    let media = &state.settings.media;
    let mut errors = FormErrors::default();

    // Validate the name before anything is written to disk
    let probe = CreateResumeTemplateRequest {
        name: name.clone(),
        preview_image: "pending".to_string(),
        description: description.clone(),
    };
    if let Err(validation) = probe.validate() {
        errors = FormErrors::from_validation(&validation);
    }
    match &preview {
        None => errors.add("preview_image", "A preview image is required"),
        Some(image) => {
            if let Err(err) = uploads::validate_image(image, media.max_upload_bytes) {
                errors.add_app_error("preview_image", err)?;
            }
        }
    }

    let Some(preview) = preview.filter(|_| errors.is_empty()) else {
        return Ok(new_template_form(jar, &current_user, name, description, errors));
    };

    let preview_path = uploads::save_uploaded_image(
        &media.root_path(),
        TEMPLATE_PREVIEWS_DIR,
        &preview,
        media.max_upload_bytes,
    ).await?;

    let request = CreateResumeTemplateRequest {
        name: name.clone(),
        preview_image: preview_path.clone(),
        description: description.clone(),
    };

    match state.service_context.template_service.create(&current_user.user, request).await {
        Ok(template) => Ok(flash::redirect_with(
            jar,
            FlashLevel::Success,
            format!("Template \"{}\" created!", template.name),
            "/templates",
        ).into_response()),
        Err(err) => {
            if let Err(cleanup) = uploads::delete_uploaded_file(&media.root_path(), &preview_path).await {
                tracing::warn!("Failed to remove orphaned preview {}: {}", preview_path, cleanup);
            }
            let errors = FormErrors::from_app_error(err)?;
            Ok(new_template_form(jar, &current_user, name, description, errors))
        }
    }
}

#[derive(Template)]
#[template(path = "templates/delete.html")]
pub struct DeleteTemplateTemplate {
    pub ctx: PageContext,
    pub template: TemplateInfo,
}

// GET /templates/:id/delete
pub async fn delete_template_page(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    ensure_staff(&current_user.user)?;
    let template = state.service_context.template_service.get(id).await?;

    let (jar, ctx) = page_context(jar, Some(&current_user.user));
    Ok((jar, HtmlTemplate(DeleteTemplateTemplate {
        ctx,
        template: TemplateInfo::from(&template),
    })))
}

// POST /templates/:id/delete
pub async fn delete_template(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let template = state.service_context.template_service
        .delete(&current_user.user, id)
        .await?;

    let media_root = state.settings.media.root_path();
    if let Err(e) = uploads::delete_uploaded_file(&media_root, &template.preview_image).await {
        tracing::warn!("Failed to remove preview for template {}: {}", template.id, e);
    }

    Ok(flash::redirect_with(
        jar,
        FlashLevel::Success,
        format!("Template \"{}\" deleted!", template.name),
        "/templates",
    ))
}
