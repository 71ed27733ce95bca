//! Image payloads to data URIs and back

use base64::Engine;

use crate::error::{AssetError, AssetResult};

/// Validate `bytes` as an image and encode them as a data URI
///
/// The MIME type comes from the image contents, falling back to the type the
/// drop source reported.
pub fn image_to_data_uri(file_name: &str, bytes: &[u8], reported_mime: Option<&str>) -> AssetResult<String> {
    if bytes.is_empty() {
        return Err(AssetError::decode(file_name, "file is empty"));
    }
    image::load_from_memory(bytes).map_err(|e| AssetError::decode(file_name, e))?;

    let mime = image::guess_format(bytes)
        .map(|f| f.to_mime_type())
        .ok()
        .or(reported_mime)
        .unwrap_or("application/octet-stream");

    Ok(format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    ))
}

/// Payload of a base64 data URI, `None` for anything else
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if !meta.ends_with(";base64") {
        return None;
    }
    base64::engine::general_purpose::STANDARD.decode(payload.trim()).ok()
}
