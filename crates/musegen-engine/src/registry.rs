use crate::model_trait::{AudioModel, ImageModel};
use musegen_core::ModelError;
use std::collections::HashMap;

pub type AudioFactory = fn() -> Box<dyn AudioModel>;
pub type ImageFactory = fn() -> Box<dyn ImageModel>;

pub struct ModelRegistry {
    audio: HashMap<String, AudioFactory>,
    image: HashMap<String, ImageFactory>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            audio: HashMap::new(),
            image: HashMap::new(),
        };
        registry.register_audio("tone", || Box::new(crate::tone_model::ToneModel::new()));
        registry.register_image("gradient", || {
            Box::new(crate::gradient_model::GradientModel::new())
        });
        #[cfg(feature = "huggingface")]
        {
            registry.register_audio("huggingface", || {
                Box::new(crate::huggingface::HuggingFaceAudioModel::new())
            });
            registry.register_image("huggingface", || {
                Box::new(crate::huggingface::HuggingFaceImageModel::new())
            });
        }
        registry
    }

    pub fn register_audio(&mut self, name: &str, factory: AudioFactory) {
        self.audio.insert(name.to_string(), factory);
    }

    pub fn register_image(&mut self, name: &str, factory: ImageFactory) {
        self.image.insert(name.to_string(), factory);
    }

    pub fn create_audio(&self, name: &str) -> Result<Box<dyn AudioModel>, ModelError> {
        self.audio
            .get(name)
            .map(|f| f())
            .ok_or_else(|| ModelError::ModelNotFound(name.to_string()))
    }

    pub fn create_image(&self, name: &str) -> Result<Box<dyn ImageModel>, ModelError> {
        self.image
            .get(name)
            .map(|f| f())
            .ok_or_else(|| ModelError::ModelNotFound(name.to_string()))
    }

    pub fn list_audio_models(&self) -> Vec<&str> {
        self.audio.keys().map(|s| s.as_str()).collect()
    }

    pub fn list_image_models(&self) -> Vec<&str> {
        self.image.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
