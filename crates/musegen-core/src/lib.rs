pub mod config;
pub mod error;
pub mod params;
pub mod types;

pub use config::{
    AppConfig, AudioConfig, GenerationConfig, HuggingFaceConfig, ImageConfig, ResponseMode,
    ServerConfig,
};
pub use error::{CodecError, ConfigError, ModelError, RequestError};
pub use params::GenerationParams;
pub use types::{GenerationRequest, ImageParams, Waveform};
