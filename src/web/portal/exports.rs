use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension,
};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    error::{AppError, Result},
    export::ExportFormat,
};

async fn export(state: &AppState, current_user: &CurrentUser, id: i64, format: ExportFormat) -> Result<Response> {
    let rendered = state.service_context.resume_service
        .export(&current_user.user, id, format)
        .await?;

    let disposition = HeaderValue::from_str(&rendered.content_disposition())
        .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition: {}", e)))?;

    tracing::info!(
        "User {} exported resume {} as {} ({} bytes)",
        current_user.user.id,
        id,
        format.extension(),
        rendered.bytes.len()
    );

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(rendered.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        rendered.bytes,
    ).into_response())
}

// GET /resume/:id/export/pdf
pub async fn export_pdf(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response> {
    export(&state, &current_user, id, ExportFormat::Pdf).await
}

// GET /resume/:id/export/docx
pub async fn export_docx(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response> {
    export(&state, &current_user, id, ExportFormat::Docx).await
}
