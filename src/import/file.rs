//! Dropped files and concurrent reads

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::{AssetError, AssetResult};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

/// Where a dropped file's contents come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// A file handed to the import pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    /// File name as dropped, including extension
    pub name: String,
    /// MIME type reported by the drop source, if any
    pub mime: Option<String>,
    pub source: FileSource,
}

impl DroppedFile {
    pub fn from_bytes(name: impl Into<String>, mime: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.map(String::from),
            source: FileSource::Bytes(bytes),
        }
    }

    /// File on disk; the name is the path's final component
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            mime: None,
            source: FileSource::Path(path.to_path_buf()),
        }
    }

    fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }

    /// Tagged `image/*`, or carries an image extension when untagged
    pub fn is_image(&self) -> bool {
        match &self.mime {
            Some(mime) => mime.starts_with("image/"),
            None => self
                .extension()
                .map(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
                .unwrap_or(false),
        }
    }

    /// Name ends in `.gltf`, any case
    pub fn is_gltf(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with(".gltf")
    }

    pub fn read(&self) -> AssetResult<Vec<u8>> {
        match &self.source {
            FileSource::Bytes(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => fs::read(path).map_err(|e| AssetError::decode(&self.name, e)),
        }
    }
}

/// Read every file on the rayon pool; results keep the input order
pub fn read_all(files: &[DroppedFile]) -> Vec<AssetResult<Vec<u8>>> {
    files.par_iter().map(DroppedFile::read).collect()
}

/// Asset name from a file name: everything before the last extension
///
/// `grass.png` → `grass`, `archive.tar.gz` → `archive.tar`, `README` →
/// `README`. A name that would come out empty is rejected.
pub fn derive_name(file_name: &str) -> AssetResult<String> {
    let stem = match file_name.rfind('.') {
        Some(dot) => {
            let ext = &file_name[dot + 1..];
            if !ext.is_empty() && !ext.contains('/') {
                &file_name[..dot]
            } else {
                file_name
            }
        }
        None => file_name,
    };
    if stem.trim().is_empty() {
        return Err(AssetError::decode(file_name, "file name has no stem"));
    }
    Ok(stem.to_string())
}
