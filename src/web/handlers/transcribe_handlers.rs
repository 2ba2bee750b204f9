// src/web/handlers/transcribe_handlers.rs
use crate::core::OpenAiClient;
use crate::web::handlers::{error_reply, ErrorReply};
use crate::web::types::{TranscribeForm, TranscriptionData};

use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

const DEFAULT_AUDIO_EXTENSION: &str = "webm";

pub async fn transcribe_handler(
    mut upload: Form<TranscribeForm<'_>>,
    client: &State<Arc<OpenAiClient>>,
) -> Result<Json<TranscriptionData>, ErrorReply> {
    let Some(audio) = upload.audio.as_mut() else {
        return Err(error_reply(
            Status::BadRequest,
            "No audio file uploaded.",
            "MISSING_AUDIO",
            &["Send the recording as the 'audio' multipart field"],
        ));
    };

    let extension = audio
        .content_type()
        .and_then(|ct| ct.extension())
        .map(|ext| ext.as_str().to_lowercase())
        .unwrap_or_else(|| DEFAULT_AUDIO_EXTENSION.to_string());
    let file_name = format!("upload_{}.{}", Uuid::new_v4(), extension);
    let temp_path = std::env::temp_dir().join(&file_name);

    info!("Received audio upload of {} bytes", audio.len());

    if let Err(e) = audio.copy_to(&temp_path).await {
        error!("Failed to store audio upload: {}", e);
        return Err(transcription_failed());
    }

    let result = client.transcribe(&temp_path, &file_name).await;

    if let Err(e) = tokio::fs::remove_file(&temp_path).await {
        warn!("Failed to remove {}: {}", temp_path.display(), e);
    }

    match result {
        Ok(text) => Ok(Json(TranscriptionData { text })),
        Err(e) => {
            error!("Transcription failed: {:#}", e);
            Err(transcription_failed())
        }
    }
}

fn transcription_failed() -> ErrorReply {
    error_reply(
        Status::InternalServerError,
        "Failed to transcribe audio.",
        "TRANSCRIPTION_ERROR",
        &["Try again in a few moments", "Type your question instead"],
    )
}
