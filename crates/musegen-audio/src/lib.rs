//! Containers for generated media: WAV for audio, PNG for images, and the
//! base64 text form used to embed either one in JSON.

pub mod envelope;
pub mod png;
pub mod wav;

pub use envelope::{from_base64, to_base64};
pub use png::{decode_image, encode_png, is_png, PNG_SIGNATURE};
pub use wav::{decode_wav, encode_wav};
