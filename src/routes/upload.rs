use axum::{extract::Multipart, response::IntoResponse, Json};

use crate::dto::upload_dto::UploadResponse;
use crate::error::{Error, Result};
use crate::services::resume_service;

const RESUME_FIELD: &str = "resume";

#[axum::debug_handler]
pub async fn upload_resume(mut multipart: Multipart) -> Result<impl IntoResponse> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        Error::BadRequest(e.to_string())
    })? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let mime = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(Error::Multipart)?;
        tracing::info!(file_name = %file_name, mime = %mime, size = data.len(), "Resume uploaded");

        let text = resume_service::extract_text(data, &file_name, &mime)
            .await
            .map_err(|e| {
                tracing::error!("Upload parse error: {}", e);
                e
            })?;
        let fields = resume_service::extract_fields(&text);
        return Ok(Json(UploadResponse::from(fields)));
    }

    Err(Error::BadRequest("No file uploaded".to_string()))
}
