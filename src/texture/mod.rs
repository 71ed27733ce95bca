//! Texture authoring
//!
//! - [`RasterBuffer`]: RGBA pixel grid, PNG / data URI encoding
//! - [`CanvasSet`]: main canvas plus one buffer per face
//! - [`EditHistory`]: undo/redo with "apply to all faces" as one step
//! - [`TextureSession`]: editing tools over a canvas set
//! - [`export`]: write a block's faces out as PNG files

pub mod export;
mod face;
mod history;
mod raster;
mod session;

pub use face::{CanvasSet, FaceTarget, Slot, TextureFace};
pub use history::{EditHistory, HistoryConfig, HistoryState, RasterDelta};
pub use raster::{line_points, PixelWrite, RasterBuffer, Rgba, MAGENTA, TRANSPARENT};
pub use session::{TextureExport, TextureSession};

/// Default editing resolution
pub const DEFAULT_GRID_SIZE: usize = 24;
