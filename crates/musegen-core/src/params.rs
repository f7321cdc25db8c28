use crate::config::GenerationConfig;
use crate::error::RequestError;
use crate::types::GenerationRequest;

/// Codec tokens generated per second of audio.
///
/// Assumes a 50 Hz frame rate. Unvalidated against the model actually
/// loaded; a model with a different frame rate will over- or under-shoot.
pub const TOKENS_PER_SECOND: u32 = 50;

/// Tokens added on top of the per-second budget.
pub const TOKEN_HEADROOM: u32 = 20;

/// Model-facing parameters for one audio generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub prompt: String,
    pub model: String,
    pub duration_secs: u32,
    pub max_new_tokens: u32,
    pub do_sample: bool,
    pub guidance_scale: f32,
    pub temperature: Option<f32>,
    pub sample_rate: u32,
}

/// `duration * 50 + 20`, or `None` on overflow.
pub fn tokens_for_duration(duration_secs: u32) -> Option<u32> {
    duration_secs
        .checked_mul(TOKENS_PER_SECOND)?
        .checked_add(TOKEN_HEADROOM)
}

impl GenerationParams {
    /// Validate a request against the generation settings and derive the
    /// parameters passed to the audio model.
    pub fn from_request(
        request: &GenerationRequest,
        config: &GenerationConfig,
    ) -> Result<Self, RequestError> {
        let max = config.max_duration_secs;
        let duration_secs = u32::try_from(request.duration)
            .ok()
            .filter(|d| (1..=max).contains(d))
            .ok_or(RequestError::DurationOutOfRange {
                got: request.duration,
                max,
            })?;

        let max_new_tokens = tokens_for_duration(duration_secs)
            .ok_or(RequestError::TokenOverflow(request.duration))?;

        Ok(Self {
            prompt: request.prompt.clone(),
            model: request.model.clone(),
            duration_secs,
            max_new_tokens,
            do_sample: true,
            guidance_scale: config.guidance_scale,
            temperature: config.temperature,
            sample_rate: config.sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(duration: i64) -> GenerationRequest {
        GenerationRequest::new("lofi piano", duration)
    }

    #[test]
    fn test_tokens_for_default_duration() {
        assert_eq!(tokens_for_duration(10), Some(520));
    }

    #[test]
    fn test_tokens_for_one_second() {
        assert_eq!(tokens_for_duration(1), Some(70));
    }

    #[test]
    fn test_tokens_overflow_is_none() {
        assert_eq!(tokens_for_duration(u32::MAX), None);
    }

    #[test]
    fn test_params_from_default_request() {
        let params =
            GenerationParams::from_request(&request(10), &GenerationConfig::default()).unwrap();
        assert_eq!(params.prompt, "lofi piano");
        assert_eq!(params.model, "facebook/musicgen-small");
        assert_eq!(params.duration_secs, 10);
        assert_eq!(params.max_new_tokens, 520);
        assert!(params.do_sample);
        assert_eq!(params.guidance_scale, 3.0);
        assert_eq!(params.sample_rate, 32000);
        assert!(params.temperature.is_none());
    }

    #[test]
    fn test_params_zero_duration_rejected() {
        let err =
            GenerationParams::from_request(&request(0), &GenerationConfig::default()).unwrap_err();
        assert_eq!(err, RequestError::DurationOutOfRange { got: 0, max: 30 });
    }

    #[test]
    fn test_params_negative_duration_rejected() {
        let result = GenerationParams::from_request(&request(-5), &GenerationConfig::default());
        assert!(matches!(
            result,
            Err(RequestError::DurationOutOfRange { got: -5, .. })
        ));
    }

    #[test]
    fn test_params_duration_above_max_rejected() {
        let result = GenerationParams::from_request(&request(31), &GenerationConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_params_duration_at_max_accepted() {
        let params =
            GenerationParams::from_request(&request(30), &GenerationConfig::default()).unwrap();
        assert_eq!(params.max_new_tokens, 30 * 50 + 20);
    }

    #[test]
    fn test_params_huge_max_duration_overflow() {
        let config = GenerationConfig {
            max_duration_secs: u32::MAX,
            ..GenerationConfig::default()
        };
        let result = GenerationParams::from_request(&request(i64::from(u32::MAX)), &config);
        assert!(matches!(result, Err(RequestError::TokenOverflow(_))));
    }

    #[test]
    fn test_params_carry_config_sampling_settings() {
        let config = GenerationConfig {
            guidance_scale: 5.0,
            temperature: Some(0.7),
            sample_rate: 16000,
            ..GenerationConfig::default()
        };
        let params = GenerationParams::from_request(&request(2), &config).unwrap();
        assert_eq!(params.guidance_scale, 5.0);
        assert_eq!(params.temperature, Some(0.7));
        assert_eq!(params.sample_rate, 16000);
    }
}
