use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use musegen_core::CodecError;

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn from_base64(text: &str) -> Result<Vec<u8>, CodecError> {
    STANDARD
        .decode(text)
        .map_err(|e| CodecError::Base64(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_base64_padded_standard_alphabet() {
        assert_eq!(to_base64(b"RIFF"), "UklGRg==");
        assert_eq!(to_base64(&[0xfb, 0xff]), "+/8=");
    }

    #[test]
    fn test_from_base64_decodes() {
        assert_eq!(from_base64("UklGRg==").unwrap(), b"RIFF");
    }

    #[test]
    fn test_from_base64_rejects_url_safe_alphabet() {
        assert!(matches!(from_base64("-_8="), Err(CodecError::Base64(_))));
    }
}
