use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use musegen_core::{GenerationParams, GenerationRequest, ResponseMode};
use serde::Serialize;
use serde_json::json;
use tracing::{instrument, Instrument};

pub const WAV_FILENAME: &str = "generated_music.wav";

/// Body of an envelope-mode `/generate` response.
#[derive(Debug, Serialize)]
pub struct GenerationEnvelope {
    pub audio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn wav_attachment(wav: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "audio/wav".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{WAV_FILENAME}\""),
            ),
        ],
        Body::from(wav),
    )
        .into_response()
}

/// `POST /generate`
#[instrument(skip_all)]
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    tracing::info!(
        prompt = %request.prompt,
        duration = request.duration,
        model = %request.model,
        "starting generation"
    );

    let params = GenerationParams::from_request(&request, &state.generation)?;
    tracing::info!(
        "generating with max_new_tokens {} for {} seconds",
        params.max_new_tokens,
        params.duration_secs
    );

    // Detached so a client disconnect does not cancel a generation in flight.
    let task = tokio::spawn(run_generation(state, params).in_current_span());
    task.await
        .map_err(|e| ApiError::internal(format!("generation task failed: {e}")))?
}

async fn run_generation(state: AppState, params: GenerationParams) -> Result<Response, ApiError> {
    match state.response_mode {
        ResponseMode::Stream => {
            let wave = state.service.generate_audio(&params).await?;
            let wav = musegen_audio::encode_wav(&wave)?;
            tracing::info!(bytes = wav.len(), "returning generated audio");
            Ok(wav_attachment(wav))
        }
        ResponseMode::Envelope => {
            // Image first; the bitmap is dropped once encoded, before audio generation.
            let image = state
                .service
                .generate_image(&params.prompt)
                .await?
                .map(|bitmap| musegen_audio::encode_png(&bitmap))
                .transpose()?
                .map(|png| musegen_audio::to_base64(&png));

            let wave = state.service.generate_audio(&params).await?;
            let audio = musegen_audio::to_base64(&musegen_audio::encode_wav(&wave)?);
            tracing::info!(
                audio_b64 = audio.len(),
                image_b64 = image.as_ref().map_or(0, String::len),
                "returning generation envelope"
            );
            Ok(Json(GenerationEnvelope { audio, image }).into_response())
        }
    }
}

/// `GET /health`
#[instrument(skip_all)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "audio_model": state.service.audio_model_name(),
            "image_model": state.service.image_model_name(),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_attachment_headers() {
        let response = wav_attachment(b"RIFF".to_vec());
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "audio/wav");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"generated_music.wav\""
        );
    }

    #[test]
    fn test_envelope_omits_missing_image() {
        let envelope = GenerationEnvelope {
            audio: "UklGRg==".to_string(),
            image: None,
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({ "audio": "UklGRg==" }));
    }
}
