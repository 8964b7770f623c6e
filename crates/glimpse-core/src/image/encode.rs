//! Base64 encoding for inline image payloads.
//!
//! Large images are encoded in fixed-size chunks so the intermediate working
//! set stays bounded. Chunks are a multiple of 3 bytes long, which means no
//! chunk but the last produces padding and the concatenated output is
//! identical to a single-pass encoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Default chunk size: 768 KiB of input per chunk (1 MiB of output).
pub const DEFAULT_CHUNK_BYTES: usize = 3 * 256 * 1024;

/// Encode bytes as standard base64 using the default chunk size.
pub fn encode_base64(bytes: &[u8]) -> String {
    encode_base64_chunked(bytes, DEFAULT_CHUNK_BYTES)
}

/// Encode bytes as standard base64, processing `chunk_bytes` of input at a time.
///
/// `chunk_bytes` is rounded down to a multiple of 3 (minimum 3).
pub fn encode_base64_chunked(bytes: &[u8], chunk_bytes: usize) -> String {
    let chunk = (chunk_bytes / 3).max(1) * 3;
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);
    for piece in bytes.chunks(chunk) {
        STANDARD.encode_string(piece, &mut out);
    }
    out
}

/// Decode standard base64.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(encoded)
}

/// Sniff an image media type from its leading bytes.
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 4 {
        return None;
    }

    // JPEG: FF D8 FF
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }

    // PNG: 89 50 4E 47
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        return Some("image/png");
    }

    if bytes.starts_with(b"GIF8") {
        return Some("image/gif");
    }

    // WebP: RIFF....WEBP
    if bytes.starts_with(b"RIFF") && bytes.len() >= 12 && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    if bytes.starts_with(b"BM") {
        return Some("image/bmp");
    }

    // TIFF: II (little-endian) or MM (big-endian) followed by version 42
    if bytes.starts_with(&[b'I', b'I', 0x2A, 0x00]) || bytes.starts_with(&[b'M', b'M', 0x00, 0x2A])
    {
        return Some("image/tiff");
    }

    // HEIC/HEIF/AVIF: ftyp box at offset 4, brand at offset 8
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        return match &bytes[8..12] {
            b"avif" | b"avis" => Some("image/avif"),
            _ => Some("image/heic"),
        };
    }

    None
}
