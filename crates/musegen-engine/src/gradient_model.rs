use crate::model_trait::ImageModel;
use crate::seed::prompt_seed;
use async_trait::async_trait;
use image::{Rgb, RgbImage};
use musegen_core::{ImageParams, ModelError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Offline cover-art generator: a diagonal blend between two prompt-seeded colors.
pub struct GradientModel {
    generate_count: AtomicUsize,
}

impl GradientModel {
    pub fn new() -> Self {
        Self {
            generate_count: AtomicUsize::new(0),
        }
    }

    pub fn generate_count(&self) -> usize {
        self.generate_count.load(Ordering::Relaxed)
    }
}

impl Default for GradientModel {
    fn default() -> Self {
        Self::new()
    }
}

fn color(bits: u64) -> [f32; 3] {
    [
        (bits & 0xff) as f32,
        ((bits >> 8) & 0xff) as f32,
        ((bits >> 16) & 0xff) as f32,
    ]
}

fn render(seed: u64, width: u32, height: u32) -> RgbImage {
    let from = color(seed);
    let to = color(seed >> 24);
    let span = (width + height).saturating_sub(2).max(1) as f32;

    RgbImage::from_fn(width, height, |x, y| {
        let t = (x + y) as f32 / span;
        let mix = |c: usize| (from[c] + (to[c] - from[c]) * t).round() as u8;
        Rgb([mix(0), mix(1), mix(2)])
    })
}

#[async_trait]
impl ImageModel for GradientModel {
    fn name(&self) -> &str {
        "gradient"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), ModelError> {
        Ok(())
    }

    async fn generate(&self, prompt: &str, params: &ImageParams) -> Result<RgbImage, ModelError> {
        if params.width == 0 || params.height == 0 {
            return Err(ModelError::GenerationFailed(format!(
                "empty image size {}x{}",
                params.width, params.height
            )));
        }
        let seed = prompt_seed(prompt);
        let (width, height) = (params.width, params.height);
        let image = tokio::task::spawn_blocking(move || render(seed, width, height))
            .await
            .map_err(|e| ModelError::GenerationFailed(e.to_string()))?;

        let count = self.generate_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!("GradientModel generation #{count}, {width}x{height}");
        Ok(image)
    }

    async fn shutdown(&self) -> Result<(), ModelError> {
        Ok(())
    }
}
