//! Per-face PNG export of a block

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::asset::{BlockAsset, FaceKey};
use crate::error::{AssetError, AssetResult};
use crate::import::decode_data_uri;

use super::raster::{RasterBuffer, MAGENTA};

/// Side of the placeholder written for textures that cannot be loaded
pub const PLACEHOLDER_SIZE: usize = 16;

/// One PNG per face: side texture, else main texture, else magenta
pub fn block_face_pngs(block: &BlockAsset) -> AssetResult<Vec<(FaceKey, Vec<u8>)>> {
    let main = load_png(&block.texture_uri);
    if main.is_none() {
        log::warn!("main texture of \"{}\" could not be loaded", block.name);
    }

    let mut faces = Vec::with_capacity(FaceKey::ALL.len());
    for face in FaceKey::ALL {
        let side = block.side_textures.get(&face).and_then(|uri| load_png(uri));
        let png = match side.or_else(|| main.clone()) {
            Some(png) => png,
            None => RasterBuffer::filled(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, MAGENTA).to_png()?,
        };
        faces.push((face, png));
    }
    Ok(faces)
}

/// Write `+x.png` .. `-z.png` into `dir`
pub fn write_block_faces(block: &BlockAsset, dir: &Path) -> AssetResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| AssetError::persistence("export block", e.into()))?;

    let mut written = Vec::new();
    for (face, png) in block_face_pngs(block)? {
        let path = dir.join(format!("{}.png", face.label()));
        fs::write(&path, png).map_err(|e| AssetError::persistence("export block", e.into()))?;
        written.push(path);
    }
    log::info!("exported {} faces of \"{}\" to {}", written.len(), block.name, dir.display());
    Ok(written)
}

/// Load a texture from a data URI or file path as PNG bytes
fn load_png(uri: &str) -> Option<Vec<u8>> {
    let bytes = match decode_data_uri(uri) {
        Some(bytes) => bytes,
        None if uri.starts_with("data:") => return None,
        None => fs::read(uri).ok()?,
    };

    if image::guess_format(&bytes).ok() == Some(ImageFormat::Png) {
        return Some(bytes);
    }
    let img = image::load_from_memory(&bytes).ok()?;
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png).ok()?;
    Some(png)
}
