//! Image acquisition and encoding.
//!
//! - **acquire**: fetch bytes from a URL or local file under a size ceiling
//! - **encode**: chunked base64 encoding and media type sniffing

pub mod acquire;
pub mod encode;

pub use acquire::{FetchedImage, ImageAcquirer, DEFAULT_MAX_IMAGE_BYTES, DEFAULT_MEDIA_TYPE};
pub use encode::{decode_base64, encode_base64, encode_base64_chunked, sniff_media_type};

/// Base64-encoded image ready to send to a provider.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
    /// Size of the raw image in bytes
    pub size_bytes: u64,
}

impl ImageInput {
    /// Encode raw bytes with the given media type.
    pub fn from_bytes(bytes: &[u8], media_type: &str) -> Self {
        Self {
            data: encode_base64(bytes),
            media_type: media_type.to_string(),
            size_bytes: bytes.len() as u64,
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_input_from_bytes() {
        let input = ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF], "image/jpeg");
        assert_eq!(input.media_type, "image/jpeg");
        assert_eq!(input.data, "/9j/");
        assert_eq!(input.size_bytes, 3);
    }

    #[test]
    fn test_image_input_data_url() {
        let input = ImageInput::from_bytes(&[1, 2, 3], "image/png");
        assert_eq!(input.data_url(), "data:image/png;base64,AQID");
    }
}
