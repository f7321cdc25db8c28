pub mod gradient_model;
#[cfg(feature = "huggingface")]
pub mod huggingface;
pub mod model_trait;
pub mod registry;
mod seed;
pub mod service;
pub mod tone_model;

pub use gradient_model::GradientModel;
#[cfg(feature = "huggingface")]
pub use huggingface::{HuggingFaceAudioModel, HuggingFaceImageModel};
pub use model_trait::{AudioModel, ImageModel};
pub use registry::ModelRegistry;
pub use service::ModelService;
pub use tone_model::ToneModel;
