use crate::model_trait::{AudioModel, ImageModel};
use crate::registry::ModelRegistry;
use image::RgbImage;
use musegen_core::{
    AppConfig, GenerationParams, HuggingFaceConfig, ImageParams, ModelError, Waveform,
};
use std::time::Instant;
use tokio::sync::Semaphore;

struct ImageStage {
    model: Box<dyn ImageModel>,
    params: ImageParams,
}

/// Owns the loaded models for the lifetime of the process.
///
/// Built once at startup and shared with request handlers behind an `Arc`.
/// Model calls are gated by a semaphore so concurrent requests queue for the
/// compute resource instead of contending for it.
pub struct ModelService {
    audio: Box<dyn AudioModel>,
    image: Option<ImageStage>,
    permits: Semaphore,
}

/// Config table handed to `engine`'s `initialize`.
///
/// `huggingface` comes from its typed section; any other engine gets the
/// table named after it (`[audio.<engine>]`), or an empty one.
fn engine_config(
    engine: &str,
    huggingface: Option<&HuggingFaceConfig>,
    extra: &toml::Value,
) -> Result<toml::Value, ModelError> {
    if let ("huggingface", Some(hf)) = (engine, huggingface) {
        return toml::Value::try_from(hf).map_err(|e| {
            ModelError::InitializationFailed(format!("failed to serialize huggingface config: {e}"))
        });
    }
    match extra.get(engine) {
        Some(table @ toml::Value::Table(_)) => Ok(table.clone()),
        Some(other) => Err(ModelError::InitializationFailed(format!(
            "config for engine '{engine}' must be a table, got {}",
            other.type_str()
        ))),
        None => Ok(toml::Value::Table(Default::default())),
    }
}

impl ModelService {
    pub fn new(audio: Box<dyn AudioModel>, max_concurrent: usize) -> Self {
        Self {
            audio,
            image: None,
            permits: Semaphore::new(max_concurrent.max(1)),
        }
    }

    pub fn with_image_model(mut self, model: Box<dyn ImageModel>, params: ImageParams) -> Self {
        self.image = Some(ImageStage { model, params });
        self
    }

    /// Create and initialize the configured models.
    pub async fn from_config(
        config: &AppConfig,
        registry: &ModelRegistry,
    ) -> Result<Self, ModelError> {
        let audio_cfg = &config.audio;
        let mut audio = registry.create_audio(&audio_cfg.engine)?;
        audio
            .initialize(engine_config(
                &audio_cfg.engine,
                audio_cfg.huggingface.as_ref(),
                &audio_cfg.extra,
            )?)
            .await?;
        tracing::info!("audio model '{}' loaded", audio.name());

        let mut service = Self::new(audio, config.generation.max_concurrent);

        if let Some(ref image_cfg) = config.image {
            let mut image = registry.create_image(&image_cfg.engine)?;
            image
                .initialize(engine_config(
                    &image_cfg.engine,
                    image_cfg.huggingface.as_ref(),
                    &image_cfg.extra,
                )?)
                .await?;
            tracing::info!("image model '{}' loaded", image.name());
            service = service.with_image_model(image, image_cfg.params());
        }

        Ok(service)
    }

    pub fn audio_model_name(&self) -> &str {
        self.audio.name()
    }

    pub fn image_model_name(&self) -> Option<&str> {
        self.image.as_ref().map(|stage| stage.model.name())
    }

    pub fn has_image_model(&self) -> bool {
        self.image.is_some()
    }

    pub async fn generate_audio(&self, params: &GenerationParams) -> Result<Waveform, ModelError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ModelError::GenerationFailed("model service is shut down".to_string()))?;

        tracing::info!(
            model = self.audio.name(),
            max_new_tokens = params.max_new_tokens,
            guidance_scale = params.guidance_scale,
            "generating audio"
        );
        let started = Instant::now();
        let wave = self.audio.generate(params).await?;
        tracing::info!(
            samples = wave.samples.len(),
            seconds = wave.duration_secs(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "audio generated"
        );
        Ok(wave)
    }

    /// Generate cover art; `Ok(None)` when no image model is configured.
    pub async fn generate_image(&self, prompt: &str) -> Result<Option<RgbImage>, ModelError> {
        let Some(ref stage) = self.image else {
            return Ok(None);
        };
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ModelError::GenerationFailed("model service is shut down".to_string()))?;

        tracing::info!(
            model = stage.model.name(),
            steps = stage.params.num_inference_steps,
            guidance_scale = stage.params.guidance_scale,
            "generating image"
        );
        let started = Instant::now();
        let image = stage.model.generate(prompt, &stage.params).await?;
        tracing::info!(
            width = image.width(),
            height = image.height(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "image generated"
        );
        Ok(Some(image))
    }

    /// Refuse new generations and shut every model down.
    pub async fn shutdown(&self) {
        self.permits.close();
        if let Err(e) = self.audio.shutdown().await {
            tracing::error!(model = self.audio.name(), "audio model shutdown error: {e}");
        }
        if let Some(ref stage) = self.image {
            if let Err(e) = stage.model.shutdown().await {
                tracing::error!(model = stage.model.name(), "image model shutdown error: {e}");
            }
        }
    }
}
