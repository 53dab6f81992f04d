use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension, Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{UpdateUserRequest, User},
    error::Result,
    web::{
        flash::{self, FlashLevel},
        forms::FormErrors,
        page_context,
        templates::{HtmlTemplate, PageContext},
    },
};
use super::resumes::{template_names, ResumeInfo};

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub ctx: PageContext,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub joined_at: String,
    pub resumes: Vec<ResumeInfo>,
    pub errors: FormErrors,
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Validate)]
pub struct ProfileInput {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: String,
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: String,
}

impl From<ProfileForm> for ProfileInput {
    fn from(form: ProfileForm) -> Self {
        let email = form.email.trim();
        Self {
            email: (!email.is_empty()).then(|| email.to_string()),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
        }
    }
}

async fn render_profile(
    state: &AppState,
    jar: CookieJar,
    user: &User,
    input: ProfileInput,
    errors: FormErrors,
) -> Result<Response> {
    let resumes = state.service_context.resume_service.list_resumes(user).await?;
    let names = template_names(state).await?;

    let (jar, ctx) = page_context(jar, Some(user));

    Ok((jar, HtmlTemplate(ProfileTemplate {
        ctx,
        username: user.username.clone(),
        email: input.email.unwrap_or_default(),
        first_name: input.first_name,
        last_name: input.last_name,
        joined_at: user.created_at.format("%B %d, %Y").to_string(),
        resumes: resumes.iter().map(|r| ResumeInfo::new(r, &names)).collect(),
        errors,
    })).into_response())
}

// GET /profile
pub async fn profile_page(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<Response> {
    let user = &current_user.user;
    let input = ProfileInput {
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    };

    render_profile(&state, jar, user, input, FormErrors::default()).await
}

// POST /profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let input = ProfileInput::from(form);

    if let Err(errors) = input.validate() {
        let errors = FormErrors::from_validation(&errors);
        return render_profile(&state, jar, &current_user.user, input, errors).await;
    }

    let update = UpdateUserRequest {
        email: Some(input.email),
        first_name: Some(input.first_name),
        last_name: Some(input.last_name),
        ..Default::default()
    };

    state.service_context.account_service
        .update_profile(&current_user.user, update)
        .await?;

    Ok(flash::redirect_with(jar, FlashLevel::Success, "Profile updated successfully!", "/profile")
        .into_response())
}
