//! Models served by a Hugging Face style HTTP inference endpoint.
//!
//! Both models `POST {base_url}/{model}` with `{"inputs": ..., "parameters": ...}`
//! and read the raw media bytes from the response body.

use crate::model_trait::{AudioModel, ImageModel};
use async_trait::async_trait;
use image::RgbImage;
use musegen_core::{GenerationParams, HuggingFaceConfig, ImageParams, ModelError, Waveform};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Serialize;

pub const DEFAULT_IMAGE_MODEL: &str = "runwayml/stable-diffusion-v1-5";

/// Request body sent to the inference endpoint.
#[derive(Debug, Serialize)]
pub struct InferenceRequest<'a, P: Serialize> {
    pub inputs: &'a str,
    pub parameters: P,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct AudioParameters {
    pub max_new_tokens: u32,
    pub do_sample: bool,
    pub guidance_scale: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl From<&GenerationParams> for AudioParameters {
    fn from(params: &GenerationParams) -> Self {
        Self {
            max_new_tokens: params.max_new_tokens,
            do_sample: params.do_sample,
            guidance_scale: params.guidance_scale,
            temperature: params.temperature,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ImageParameters {
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub width: u32,
    pub height: u32,
}

impl From<&ImageParams> for ImageParameters {
    fn from(params: &ImageParams) -> Self {
        Self {
            num_inference_steps: params.num_inference_steps,
            guidance_scale: params.guidance_scale,
            width: params.width,
            height: params.height,
        }
    }
}

/// Shared HTTP plumbing for both model kinds.
struct Endpoint {
    client: Client,
    settings: Option<HuggingFaceConfig>,
}

impl Endpoint {
    fn new() -> Self {
        Self {
            client: Client::new(),
            settings: None,
        }
    }

    fn configure(&mut self, config: toml::Value) -> Result<&HuggingFaceConfig, ModelError> {
        let settings: HuggingFaceConfig = config
            .try_into()
            .map_err(|e| ModelError::InitializationFailed(format!("huggingface config: {e}")))?;
        reqwest::Url::parse(&settings.base_url).map_err(|e| {
            ModelError::InitializationFailed(format!("base_url '{}': {e}", settings.base_url))
        })?;
        Ok(self.settings.insert(settings))
    }

    fn settings(&self) -> Result<&HuggingFaceConfig, ModelError> {
        self.settings
            .as_ref()
            .ok_or_else(|| ModelError::GenerationFailed("model not initialized".to_string()))
    }

    fn url(&self, model: &str) -> Result<String, ModelError> {
        let settings = self.settings()?;
        let model = settings.model.as_deref().unwrap_or(model);
        Ok(format!("{}/{}", settings.base_url.trim_end_matches('/'), model))
    }

    async fn post<P: Serialize + Send + Sync>(
        &self,
        url: &str,
        accept: &str,
        body: &InferenceRequest<'_, P>,
    ) -> Result<Vec<u8>, ModelError> {
        let settings = self.settings()?;
        let mut request = self.client.post(url).header(ACCEPT, accept).json(body);
        if let Some(ref token) = settings.api_token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(url = %url, "sending inference request");
        let response = request
            .send()
            .await
            .map_err(|e| ModelError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(url = %url, status = %status, "inference request rejected");
            return Err(ModelError::RequestFailed(format!("{url} returned {status}: {text}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ModelError::RequestFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

pub struct HuggingFaceAudioModel {
    endpoint: Endpoint,
}

impl HuggingFaceAudioModel {
    pub fn new() -> Self {
        Self {
            endpoint: Endpoint::new(),
        }
    }

    /// URL the next generation for `model` will be sent to.
    pub fn url_for(&self, model: &str) -> Result<String, ModelError> {
        self.endpoint.url(model)
    }
}

impl Default for HuggingFaceAudioModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioModel for HuggingFaceAudioModel {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), ModelError> {
        let settings = self.endpoint.configure(config)?;
        tracing::info!(
            base_url = %settings.base_url,
            model_override = ?settings.model,
            authenticated = settings.api_token.is_some(),
            "HuggingFaceAudioModel initialized"
        );
        Ok(())
    }

    async fn generate(&self, params: &GenerationParams) -> Result<Waveform, ModelError> {
        let url = self.endpoint.url(&params.model)?;
        let body = InferenceRequest {
            inputs: &params.prompt,
            parameters: AudioParameters::from(params),
        };
        let bytes = self.endpoint.post(&url, "audio/wav", &body).await?;
        let wave = musegen_audio::decode_wav(&bytes)
            .map_err(|e| ModelError::GenerationFailed(e.to_string()))?;

        if wave.sample_rate != params.sample_rate {
            tracing::warn!(
                expected = params.sample_rate,
                actual = wave.sample_rate,
                "endpoint returned audio at an unexpected sample rate"
            );
        }
        Ok(wave)
    }

    async fn shutdown(&self) -> Result<(), ModelError> {
        Ok(())
    }
}

pub struct HuggingFaceImageModel {
    endpoint: Endpoint,
}

impl HuggingFaceImageModel {
    pub fn new() -> Self {
        Self {
            endpoint: Endpoint::new(),
        }
    }

    /// URL the next generation for `model` will be sent to.
    pub fn url_for(&self, model: &str) -> Result<String, ModelError> {
        self.endpoint.url(model)
    }
}

impl Default for HuggingFaceImageModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageModel for HuggingFaceImageModel {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), ModelError> {
        let settings = self.endpoint.configure(config)?;
        tracing::info!(
            base_url = %settings.base_url,
            model = settings.model.as_deref().unwrap_or(DEFAULT_IMAGE_MODEL),
            "HuggingFaceImageModel initialized"
        );
        Ok(())
    }

    async fn generate(&self, prompt: &str, params: &ImageParams) -> Result<RgbImage, ModelError> {
        let url = self.url_for(DEFAULT_IMAGE_MODEL)?;
        let body = InferenceRequest {
            inputs: prompt,
            parameters: ImageParameters::from(params),
        };
        let bytes = self.endpoint.post(&url, "image/png", &body).await?;
        musegen_audio::decode_image(&bytes).map_err(|e| ModelError::GenerationFailed(e.to_string()))
    }

    async fn shutdown(&self) -> Result<(), ModelError> {
        Ok(())
    }
}
