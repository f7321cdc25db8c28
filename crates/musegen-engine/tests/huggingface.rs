#![cfg(feature = "huggingface")]

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use image::{Rgb, RgbImage};
use musegen_core::{
    GenerationConfig, GenerationParams, GenerationRequest, ImageParams, ModelError, Waveform,
};
use musegen_engine::{AudioModel, HuggingFaceAudioModel, HuggingFaceImageModel, ImageModel};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Captured {
    model: String,
    body: serde_json::Value,
    auth: Option<String>,
    accept: Option<String>,
}

type Seen = Arc<Mutex<Vec<Captured>>>;

fn capture(seen: &Seen, model: String, headers: &HeaderMap, body: serde_json::Value) {
    let value_of = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    seen.lock().unwrap().push(Captured {
        model,
        body,
        auth: value_of(header::AUTHORIZATION),
        accept: value_of(header::ACCEPT),
    });
}

async fn audio_endpoint(
    State(seen): State<Seen>,
    Path(model): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    capture(&seen, model, &headers, body);
    let wave = Waveform::mono(vec![0.25; 640], 32000);
    (
        [(header::CONTENT_TYPE, "audio/wav")],
        musegen_audio::encode_wav(&wave).unwrap(),
    )
}

async fn image_endpoint(
    State(seen): State<Seen>,
    Path(model): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    capture(&seen, model, &headers, body);
    let image = RgbImage::from_pixel(8, 8, Rgb([200, 100, 50]));
    (
        [(header::CONTENT_TYPE, "image/png")],
        musegen_audio::encode_png(&image).unwrap(),
    )
}

async fn loading_endpoint() -> impl IntoResponse {
    (StatusCode::SERVICE_UNAVAILABLE, "Model is currently loading")
}

async fn garbage_endpoint() -> impl IntoResponse {
    "<html>not audio</html>"
}

async fn spawn_mock(seen: Seen) -> String {
    let router = Router::new()
        .route("/audio/*model", post(audio_endpoint))
        .route("/image/*model", post(image_endpoint))
        .route("/loading/*model", post(loading_endpoint))
        .route("/garbage/*model", post(garbage_endpoint))
        .with_state(seen);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn hf_config(base_url: String, token: Option<&str>) -> toml::Value {
    let mut table = toml::map::Map::new();
    table.insert("base_url".to_string(), toml::Value::String(base_url));
    if let Some(token) = token {
        table.insert(
            "api_token".to_string(),
            toml::Value::String(token.to_string()),
        );
    }
    toml::Value::Table(table)
}

fn params(prompt: &str, duration: i64) -> GenerationParams {
    GenerationParams::from_request(
        &GenerationRequest::new(prompt, duration),
        &GenerationConfig::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_audio_model_posts_prompt_and_decodes_wav() {
    let seen = Seen::default();
    let base = spawn_mock(Arc::clone(&seen)).await;

    let mut model = HuggingFaceAudioModel::new();
    model
        .initialize(hf_config(format!("{base}/audio"), Some("hf_secret")))
        .await
        .unwrap();

    let wave = model.generate(&params("ambient drone", 10)).await.unwrap();
    assert_eq!(wave.sample_rate, 32000);
    assert_eq!(wave.samples, vec![0.25; 640]);

    let captured = seen.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].model, "facebook/musicgen-small");
    assert_eq!(captured[0].auth.as_deref(), Some("Bearer hf_secret"));
    assert_eq!(captured[0].accept.as_deref(), Some("audio/wav"));
    assert_eq!(captured[0].body["inputs"], "ambient drone");
    assert_eq!(captured[0].body["parameters"]["max_new_tokens"], 520);
    assert_eq!(captured[0].body["parameters"]["do_sample"], true);
    assert_eq!(captured[0].body["parameters"]["guidance_scale"], 3.0);
}

#[tokio::test]
async fn test_audio_model_without_token_sends_no_auth() {
    let seen = Seen::default();
    let base = spawn_mock(Arc::clone(&seen)).await;

    let mut model = HuggingFaceAudioModel::new();
    model
        .initialize(hf_config(format!("{base}/audio"), None))
        .await
        .unwrap();
    model.generate(&params("x", 1)).await.unwrap();

    assert!(seen.lock().unwrap()[0].auth.is_none());
}

#[tokio::test]
async fn test_audio_model_error_status_surfaces_body() {
    let base = spawn_mock(Seen::default()).await;

    let mut model = HuggingFaceAudioModel::new();
    model
        .initialize(hf_config(format!("{base}/loading"), None))
        .await
        .unwrap();

    match model.generate(&params("x", 1)).await {
        Err(ModelError::RequestFailed(msg)) => {
            assert!(msg.contains("503"), "got: {msg}");
            assert!(msg.contains("currently loading"), "got: {msg}");
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_audio_model_non_wav_body_fails() {
    let base = spawn_mock(Seen::default()).await;

    let mut model = HuggingFaceAudioModel::new();
    model
        .initialize(hf_config(format!("{base}/garbage"), None))
        .await
        .unwrap();

    assert!(matches!(
        model.generate(&params("x", 1)).await,
        Err(ModelError::GenerationFailed(_))
    ));
}

#[tokio::test]
async fn test_audio_model_unreachable_endpoint_fails() {
    let mut model = HuggingFaceAudioModel::new();
    // Port 9 (discard) is not expected to accept HTTP connections.
    model
        .initialize(hf_config("http://127.0.0.1:9".to_string(), None))
        .await
        .unwrap();

    assert!(matches!(
        model.generate(&params("x", 1)).await,
        Err(ModelError::RequestFailed(_))
    ));
}

#[tokio::test]
async fn test_image_model_posts_fixed_parameters() {
    let seen = Seen::default();
    let base = spawn_mock(Arc::clone(&seen)).await;

    let mut model = HuggingFaceImageModel::new();
    model
        .initialize(hf_config(format!("{base}/image"), None))
        .await
        .unwrap();

    let image_params = ImageParams {
        num_inference_steps: 30,
        guidance_scale: 7.5,
        width: 8,
        height: 8,
    };
    let image = model.generate("cover art", &image_params).await.unwrap();
    assert_eq!(image.dimensions(), (8, 8));
    assert_eq!(image.get_pixel(3, 3), &Rgb([200, 100, 50]));

    let captured = seen.lock().unwrap().clone();
    assert_eq!(captured[0].model, "runwayml/stable-diffusion-v1-5");
    assert_eq!(captured[0].accept.as_deref(), Some("image/png"));
    assert_eq!(captured[0].body["parameters"]["num_inference_steps"], 30);
    assert_eq!(captured[0].body["parameters"]["guidance_scale"], 7.5);
}
