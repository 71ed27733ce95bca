//! On-disk value format: pretty RON compressed with Brotli
//!
//! Decoding also accepts plain RON so values can be hand-edited.

use std::io::Cursor;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::StorageError;

/// Serialize to RON and compress with brotli (quality 6, window 22)
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());
    let ron_data =
        ron::ser::to_string_pretty(value, config).map_err(|e| StorageError::Serde(e.to_string()))?;

    let mut compressed = Vec::new();
    brotli::BrotliCompress(
        &mut Cursor::new(ron_data.as_bytes()),
        &mut compressed,
        &brotli::enc::BrotliEncoderParams {
            quality: 6,
            lgwin: 22,
            ..Default::default()
        },
    )
    .map_err(|e| StorageError::Compression(e.to_string()))?;

    Ok(compressed)
}

/// Decode a value written by [`encode`], or plain RON text
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StorageError> {
    let text = if starts_like_ron(bytes) {
        String::from_utf8(bytes.to_vec()).map_err(|e| StorageError::Serde(format!("invalid UTF-8: {}", e)))?
    } else {
        let mut decompressed = Vec::new();
        match brotli::BrotliDecompress(&mut Cursor::new(bytes), &mut decompressed) {
            Ok(()) => String::from_utf8(decompressed)
                .map_err(|e| StorageError::Serde(format!("invalid UTF-8 after decompression: {}", e)))?,
            // Bracketed lists can share a first byte with a brotli header
            Err(_) if starts_like_collection(bytes) => String::from_utf8(bytes.to_vec())
                .map_err(|e| StorageError::Serde(format!("invalid UTF-8: {}", e)))?,
            Err(e) => return Err(StorageError::Compression(e.to_string())),
        }
    };

    ron::from_str(&text).map_err(|e| StorageError::Serde(e.to_string()))
}

// Never a valid first byte of a brotli stream written with lgwin 22
fn starts_like_ron(bytes: &[u8]) -> bool {
    bytes
        .first()
        .map(|&b| matches!(b, b'(' | b' ' | b'\n' | b'\r' | b'\t'))
        .unwrap_or(false)
}

fn starts_like_collection(bytes: &[u8]) -> bool {
    matches!(bytes.first(), Some(b'[') | Some(b'{'))
}
