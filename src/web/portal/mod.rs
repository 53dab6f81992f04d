pub mod announcements;
pub mod exports;
pub mod gallery;
pub mod home;
pub mod profile;
pub mod resumes;
pub mod sections;

use axum::{
    Router,
    routing::{delete, get, post},
    middleware,
};
use crate::api::{middleware::auth::require_auth_redirect, state::AppState};

pub fn create_portal_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile::profile_page).post(profile::update_profile))

        // Résumés
        .route("/resumes", get(resumes::resume_list_page))
        .route("/resume/create", get(resumes::create_resume_page).post(resumes::create_resume))
        .route("/resume/:id/edit", get(resumes::edit_resume_page).post(resumes::edit_resume))
        .route("/resume/:id/delete", get(resumes::delete_resume_page).post(resumes::delete_resume))
        .route("/resume/:id/clone", post(resumes::clone_resume))
        .route("/resume/:id/view", get(resumes::view_resume_page))
        .route("/resume/:id/export/pdf", get(exports::export_pdf))
        .route("/resume/:id/export/docx", get(exports::export_docx))
        .route("/section/:id", delete(sections::delete_section))
        .route("/section/:id/delete", post(sections::delete_section))

        // Staff pages
        .route(
            "/announcement/create",
            get(announcements::new_announcement_page).post(announcements::create_announcement),
        )
        .route(
            "/announcement/:id/edit",
            get(announcements::edit_announcement_page).post(announcements::update_announcement),
        )
        .route(
            "/announcement/:id/delete",
            get(announcements::delete_announcement_page).post(announcements::delete_announcement),
        )
        .route("/templates/new", get(gallery::new_template_page).post(gallery::create_template))
        .route(
            "/templates/:id/delete",
            get(gallery::delete_template_page).post(gallery::delete_template),
        )

        .route_layer(middleware::from_fn_with_state(state, require_auth_redirect))
}
