//! Editable faces and canvas sets

use std::fmt;

use crate::asset::FaceKey;
use crate::error::{AssetError, AssetResult};

use super::raster::RasterBuffer;

/// Face as named in the texture editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureFace {
    Top,
    Bottom,
    Left,
    Right,
    Front,
    Back,
}

impl TextureFace {
    pub const ALL: [TextureFace; 6] = [
        TextureFace::Top,
        TextureFace::Bottom,
        TextureFace::Left,
        TextureFace::Right,
        TextureFace::Front,
        TextureFace::Back,
    ];

    /// Axis key the face is stored under on a block
    pub fn face_key(&self) -> FaceKey {
        match self {
            TextureFace::Top => FaceKey::PosY,
            TextureFace::Bottom => FaceKey::NegY,
            TextureFace::Left => FaceKey::NegX,
            TextureFace::Right => FaceKey::PosX,
            TextureFace::Front => FaceKey::PosZ,
            TextureFace::Back => FaceKey::NegZ,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TextureFace::Top => "top",
            TextureFace::Bottom => "bottom",
            TextureFace::Left => "left",
            TextureFace::Right => "right",
            TextureFace::Front => "front",
            TextureFace::Back => "back",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for TextureFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What an edit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceTarget {
    /// The main canvas and every face
    #[default]
    All,
    Face(TextureFace),
}

impl FaceTarget {
    /// Parses `all` or a face label
    pub fn parse(label: &str) -> AssetResult<Self> {
        if label.eq_ignore_ascii_case("all") {
            return Ok(FaceTarget::All);
        }
        TextureFace::ALL
            .iter()
            .find(|f| f.label().eq_ignore_ascii_case(label))
            .map(|f| FaceTarget::Face(*f))
            .ok_or_else(|| AssetError::Session(format!("unknown face \"{}\"", label)))
    }

    /// Canvases this target writes to
    pub fn slots(&self) -> Vec<Slot> {
        match self {
            FaceTarget::All => Slot::ALL.to_vec(),
            FaceTarget::Face(face) => vec![Slot::Face(*face)],
        }
    }
}

/// One canvas of a [`CanvasSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Main,
    Face(TextureFace),
}

impl Slot {
    pub const ALL: [Slot; 7] = [
        Slot::Main,
        Slot::Face(TextureFace::Top),
        Slot::Face(TextureFace::Bottom),
        Slot::Face(TextureFace::Left),
        Slot::Face(TextureFace::Right),
        Slot::Face(TextureFace::Front),
        Slot::Face(TextureFace::Back),
    ];
}

/// The "all" canvas plus one buffer per face, all the same size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasSet {
    main: RasterBuffer,
    faces: [RasterBuffer; 6],
}

impl CanvasSet {
    pub fn new(size: usize) -> Self {
        Self::uniform(RasterBuffer::new(size, size))
    }

    /// Every canvas starts as a copy of `buffer`
    pub fn uniform(buffer: RasterBuffer) -> Self {
        Self {
            faces: std::array::from_fn(|_| buffer.clone()),
            main: buffer,
        }
    }

    pub fn get(&self, slot: Slot) -> &RasterBuffer {
        match slot {
            Slot::Main => &self.main,
            Slot::Face(face) => &self.faces[face.index()],
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut RasterBuffer {
        match slot {
            Slot::Main => &mut self.main,
            Slot::Face(face) => &mut self.faces[face.index()],
        }
    }

    pub fn main(&self) -> &RasterBuffer {
        &self.main
    }

    pub fn face(&self, face: TextureFace) -> &RasterBuffer {
        &self.faces[face.index()]
    }

    pub fn size(&self) -> usize {
        self.main.width()
    }
}
