use async_trait::async_trait;
use image::RgbImage;
use musegen_core::{GenerationParams, ImageParams, ModelError, Waveform};

/// A text-to-audio model.
///
/// Implementations are registered via [`ModelRegistry`](crate::ModelRegistry)
/// and owned by a [`ModelService`](crate::ModelService). `generate` must not
/// keep per-call state: two calls with the same parameters are independent.
#[async_trait]
pub trait AudioModel: Send + Sync {
    /// Returns the model's registry name (e.g. `"tone"`, `"huggingface"`).
    fn name(&self) -> &str;
    /// One-time initialisation with model-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), ModelError>;
    /// Generate a waveform for the prompt in `params`.
    async fn generate(&self, params: &GenerationParams) -> Result<Waveform, ModelError>;
    /// Release any resources held by the model.
    async fn shutdown(&self) -> Result<(), ModelError>;
}

/// A text-to-image model.
#[async_trait]
pub trait ImageModel: Send + Sync {
    fn name(&self) -> &str;
    async fn initialize(&mut self, config: toml::Value) -> Result<(), ModelError>;
    async fn generate(&self, prompt: &str, params: &ImageParams) -> Result<RgbImage, ModelError>;
    async fn shutdown(&self) -> Result<(), ModelError>;
}
