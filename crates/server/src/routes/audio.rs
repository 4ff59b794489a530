use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use crisisbrief_common::CrisisBriefError;
use crisisbrief_stt::audio::is_supported_audio;
use futures_util::StreamExt;
use std::path::Path;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::AudioQuery;

/// Largest accepted upload
const MAX_AUDIO_BYTES: usize = 100 * 1024 * 1024;

fn malformed(e: impl std::fmt::Display) -> CrisisBriefError {
    CrisisBriefError::invalid_input(format!("Malformed upload: {}", e))
}

/// Transcribe an uploaded recording (multipart field `file`) and summarize it
#[post("/audio")]
pub async fn audio(
    mut payload: Multipart,
    query: web::Query<AudioQuery>,
    state: web::Data<Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(malformed)?;
        if field.content_disposition().get_name() != Some("file") {
            continue;
        }

        let filename = field
            .content_disposition()
            .get_filename()
            .unwrap_or("upload.wav")
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(malformed)?;
            if bytes.len() + data.len() > MAX_AUDIO_BYTES {
                return Err(CrisisBriefError::invalid_input(format!(
                    "Audio file exceeds {} MB",
                    MAX_AUDIO_BYTES / (1024 * 1024)
                ))
                .into());
            }
            bytes.extend_from_slice(&data);
        }

        upload = Some((filename, bytes));
    }

    let (filename, bytes) =
        upload.ok_or_else(|| CrisisBriefError::invalid_input("No file uploaded"))?;

    let path = Path::new(&filename);
    if !is_supported_audio(path) {
        return Err(CrisisBriefError::invalid_input(format!("Unsupported audio format: {}", filename)).into());
    }
    let suffix = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("wav")
        .to_string();

    let query = query.into_inner();
    let pipeline = state.default_pipeline().await?;
    let outputs = pipeline
        .process_audio(bytes, &suffix, query.language, query.structured)
        .await?;

    Ok(HttpResponse::Ok().json(outputs))
}
