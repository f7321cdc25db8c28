use crate::model_trait::AudioModel;
use crate::seed::prompt_seed;
use async_trait::async_trait;
use musegen_core::params::TOKENS_PER_SECOND;
use musegen_core::{GenerationParams, ModelError, Waveform};
use std::f32::consts::TAU;
use std::sync::atomic::{AtomicUsize, Ordering};

const DEFAULT_AMPLITUDE: f32 = 0.6;
const FADE_SECS: f32 = 0.01;

/// Offline synthesizer standing in for a neural audio model.
///
/// Renders a prompt-seeded triad, one token's worth of samples per
/// generated token, so output length follows the same duration formula a
/// real model would be driven with.
pub struct ToneModel {
    amplitude: f32,
    generate_count: AtomicUsize,
}

impl ToneModel {
    pub fn new() -> Self {
        Self {
            amplitude: DEFAULT_AMPLITUDE,
            generate_count: AtomicUsize::new(0),
        }
    }

    pub fn generate_count(&self) -> usize {
        self.generate_count.load(Ordering::Relaxed)
    }
}

impl Default for ToneModel {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn samples_per_token(sample_rate: u32) -> usize {
    (sample_rate / TOKENS_PER_SECOND) as usize
}

fn render(seed: u64, amplitude: f32, sample_rate: u32, len: usize) -> Vec<f32> {
    // Root between A2 and A4, major or minor third from the low bit.
    let root = 110.0 * 2f32.powf((seed % 25) as f32 / 12.0);
    let third = if seed & 0x100 == 0 { 4.0 } else { 3.0 };
    let freqs = [
        root,
        root * 2f32.powf(third / 12.0),
        root * 2f32.powf(7.0 / 12.0),
    ];
    let voice_gain = amplitude / freqs.len() as f32;
    let fade = ((FADE_SECS * sample_rate as f32) as usize).clamp(1, len.max(1));
    let rate = sample_rate as f32;

    (0..len)
        .map(|i| {
            let t = i as f32 / rate;
            let sum: f32 = freqs.iter().map(|f| (TAU * f * t).sin()).sum();
            let edge = i.min(len - 1 - i);
            let env = if edge < fade {
                edge as f32 / fade as f32
            } else {
                1.0
            };
            sum * voice_gain * env
        })
        .collect()
}

#[async_trait]
impl AudioModel for ToneModel {
    fn name(&self) -> &str {
        "tone"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), ModelError> {
        if let Some(value) = config.get("amplitude") {
            let amplitude = value
                .as_float()
                .or_else(|| value.as_integer().map(|i| i as f64))
                .ok_or_else(|| {
                    ModelError::InitializationFailed("'amplitude' must be a number".to_string())
                })? as f32;
            if !(amplitude > 0.0 && amplitude <= 1.0) {
                return Err(ModelError::InitializationFailed(format!(
                    "'amplitude' must be in (0, 1], got {amplitude}"
                )));
            }
            self.amplitude = amplitude;
        }
        tracing::info!(amplitude = self.amplitude, "ToneModel initialized");
        Ok(())
    }

    async fn generate(&self, params: &GenerationParams) -> Result<Waveform, ModelError> {
        let per_token = samples_per_token(params.sample_rate);
        if per_token == 0 {
            return Err(ModelError::GenerationFailed(format!(
                "sample rate {} is below one sample per token",
                params.sample_rate
            )));
        }
        let len = (params.max_new_tokens as usize)
            .checked_mul(per_token)
            .ok_or_else(|| ModelError::GenerationFailed("waveform too long".to_string()))?;

        let seed = prompt_seed(&params.prompt);
        let amplitude = self.amplitude;
        let sample_rate = params.sample_rate;
        let samples = tokio::task::spawn_blocking(move || render(seed, amplitude, sample_rate, len))
            .await
            .map_err(|e| ModelError::GenerationFailed(e.to_string()))?;

        let count = self.generate_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!("ToneModel generation #{count}, {} samples", samples.len());
        Ok(Waveform::mono(samples, sample_rate))
    }

    async fn shutdown(&self) -> Result<(), ModelError> {
        Ok(())
    }
}
