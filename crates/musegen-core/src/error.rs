use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model initialization failed: {0}")]
    InitializationFailed(String),

    #[error("generation failed: {0}")]
    GenerationFailed(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("inference request failed: {0}")]
    RequestFailed(String),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode WAV: {0}")]
    WavEncode(String),

    #[error("failed to decode WAV: {0}")]
    WavDecode(String),

    #[error("failed to encode image: {0}")]
    ImageEncode(String),

    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    #[error("invalid base64: {0}")]
    Base64(String),

    #[error("waveform contains no samples")]
    EmptyWaveform,

    #[error("{samples} samples do not divide into {channels} channel(s)")]
    ChannelMismatch { samples: usize, channels: u16 },
}

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("duration must be between 1 and {max} seconds, got {got}")]
    DurationOutOfRange { got: i64, max: u32 },

    #[error("token count overflows for duration {0}")]
    TokenOverflow(i64),
}
