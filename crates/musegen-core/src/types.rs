use serde::Deserialize;

pub const DEFAULT_DURATION_SECS: i64 = 10;
pub const DEFAULT_MODEL: &str = "facebook/musicgen-small";

/// Body of a `POST /generate` request.
///
/// Every recognized field is listed here with its default; unknown fields are
/// ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,

    #[serde(default = "default_duration")]
    pub duration: i64,

    #[serde(default = "default_model")]
    pub model: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, duration: i64) -> Self {
        Self {
            prompt: prompt.into(),
            duration,
            model: default_model(),
        }
    }
}

fn default_duration() -> i64 {
    DEFAULT_DURATION_SECS
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Interleaved PCM samples in the range `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Waveform {
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Fixed image-generation settings, taken from configuration rather than the request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub width: u32,
    pub height: u32,
}
