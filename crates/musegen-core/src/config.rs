use crate::error::ConfigError;
use crate::types::ImageParams;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub image: Option<ImageConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// How `/generate` packages its result.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Raw WAV bytes as a file attachment.
    #[default]
    Stream,
    /// JSON object with base64 `audio` and `image` fields.
    Envelope,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default)]
    pub response_mode: ResponseMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origins: default_allowed_origins(),
            response_mode: ResponseMode::default(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("bind address '{}': {e}", self.bind)))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u32,

    #[serde(default = "default_audio_guidance")]
    pub guidance_scale: f32,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            max_duration_secs: default_max_duration(),
            guidance_scale: default_audio_guidance(),
            max_concurrent: default_max_concurrent(),
            temperature: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AudioConfig {
    #[serde(default = "default_audio_engine")]
    pub engine: String,

    #[serde(default)]
    pub huggingface: Option<HuggingFaceConfig>,

    /// Per-engine tables, e.g. `[audio.tone]`, keyed by engine name.
    #[serde(flatten)]
    pub extra: toml::Value,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            engine: default_audio_engine(),
            huggingface: None,
            extra: empty_table(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageConfig {
    #[serde(default = "default_image_engine")]
    pub engine: String,

    #[serde(default = "default_inference_steps")]
    pub num_inference_steps: u32,

    #[serde(default = "default_image_guidance")]
    pub guidance_scale: f32,

    #[serde(default = "default_image_side")]
    pub width: u32,

    #[serde(default = "default_image_side")]
    pub height: u32,

    #[serde(default)]
    pub huggingface: Option<HuggingFaceConfig>,

    #[serde(flatten)]
    pub extra: toml::Value,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            engine: default_image_engine(),
            num_inference_steps: default_inference_steps(),
            guidance_scale: default_image_guidance(),
            width: default_image_side(),
            height: default_image_side(),
            huggingface: None,
            extra: empty_table(),
        }
    }
}

impl ImageConfig {
    pub fn params(&self) -> ImageParams {
        ImageParams {
            num_inference_steps: self.num_inference_steps,
            guidance_scale: self.guidance_scale,
            width: self.width,
            height: self.height,
        }
    }
}

/// Settings for a Hugging Face style HTTP inference endpoint.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HuggingFaceConfig {
    #[serde(default = "default_hf_base_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Overrides the model named in the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

fn empty_table() -> toml::Value {
    toml::Value::Table(toml::map::Map::new())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

fn default_sample_rate() -> u32 {
    32000
}

fn default_max_duration() -> u32 {
    30
}

fn default_audio_guidance() -> f32 {
    3.0
}

fn default_max_concurrent() -> usize {
    1
}

fn default_audio_engine() -> String {
    "tone".to_string()
}

fn default_image_engine() -> String {
    "gradient".to_string()
}

fn default_inference_steps() -> u32 {
    25
}

fn default_image_guidance() -> f32 {
    7.5
}

fn default_image_side() -> u32 {
    512
}

fn default_hf_base_url() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

/// Interpolate `${VAR}` patterns with environment variable values.
///
/// Full-line comments are copied through untouched.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::Invalid(e.to_string()))?;
    let mut result = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            continue;
        }
        let mut expanded = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            let val = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            expanded = expanded.replace(&cap[0], &val);
        }
        result.push_str(&expanded);
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.sample_rate == 0 {
            return Err(ConfigError::Invalid("sample_rate must be positive".into()));
        }
        if self.generation.max_duration_secs == 0 {
            return Err(ConfigError::Invalid(
                "max_duration_secs must be positive".into(),
            ));
        }
        if self.generation.max_concurrent == 0 {
            return Err(ConfigError::Invalid("max_concurrent must be positive".into()));
        }
        if let Some(ref image) = self.image {
            if image.width == 0 || image.height == 0 {
                return Err(ConfigError::Invalid(format!(
                    "image size {}x{} is empty",
                    image.width, image.height
                )));
            }
        }
        self.server.socket_addr()?;
        Ok(())
    }
}
