use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    error::Result,
    web::flash::{self, FlashLevel},
};

// DELETE /section/:id and POST /section/:id/delete
pub async fn delete_section(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let resume_id = state.service_context.resume_service
        .delete_section(&current_user.user, id)
        .await?;

    Ok(flash::redirect_with(
        jar,
        FlashLevel::Success,
        "Section deleted!",
        &format!("/resume/{}/edit", resume_id),
    ))
}
