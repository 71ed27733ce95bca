//! Texture editing session
//!
//! Owns the canvases for one asset being authored and routes every tool
//! through [`EditHistory`]. Pencil strokes paint live and become a single
//! history entry when the stroke ends.

use std::collections::BTreeMap;

use crate::asset::FaceKey;
use crate::error::{AssetError, AssetResult};

use super::face::{CanvasSet, FaceTarget, Slot, TextureFace};
use super::history::{EditHistory, HistoryConfig, HistoryState, RasterDelta};
use super::raster::{PixelWrite, RasterBuffer, Rgba};

/// Finished textures ready to become a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureExport {
    /// PNG data URI of the main canvas
    pub main: String,
    /// PNG data URIs of faces that differ from the main canvas
    pub sides: BTreeMap<FaceKey, String>,
}

#[derive(Debug)]
struct Stroke {
    target: FaceTarget,
    color: Rgba,
    last: (i32, i32),
    before: Vec<(Slot, RasterBuffer)>,
}

#[derive(Debug)]
pub struct TextureSession {
    canvases: Option<CanvasSet>,
    history: EditHistory,
    stroke: Option<Stroke>,
    target: FaceTarget,
}

impl TextureSession {
    /// Blank (transparent) canvases of `size`×`size`
    pub fn new(size: usize, history: HistoryConfig) -> Self {
        Self {
            canvases: Some(CanvasSet::new(size)),
            history: EditHistory::new(history),
            stroke: None,
            target: FaceTarget::All,
        }
    }

    /// Seed every canvas from an image, resized to `size`×`size`
    pub fn from_image(bytes: &[u8], size: usize, history: HistoryConfig) -> AssetResult<Self> {
        let seed = RasterBuffer::from_image_bytes(bytes, size)?;
        Ok(Self {
            canvases: Some(CanvasSet::uniform(seed)),
            history: EditHistory::new(history),
            stroke: None,
            target: FaceTarget::All,
        })
    }

    pub fn is_open(&self) -> bool {
        self.canvases.is_some()
    }

    pub fn target(&self) -> FaceTarget {
        self.target
    }

    /// Select what later edits apply to; ends nothing in progress
    pub fn set_target(&mut self, target: FaceTarget) {
        self.target = target;
    }

    pub fn canvases(&self) -> AssetResult<&CanvasSet> {
        self.canvases.as_ref().ok_or_else(closed)
    }

    pub fn history_state(&self) -> HistoryState {
        self.history.state()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(HistoryState) + 'static) {
        self.history.subscribe(listener);
    }

    // Pencil

    pub fn begin_stroke(&mut self, x: i32, y: i32, color: Rgba) -> AssetResult<()> {
        if self.stroke.is_some() {
            self.end_stroke()?;
        }
        let target = self.target;
        let canvases = self.canvases.as_mut().ok_or_else(closed)?;
        let before = target.slots().into_iter().map(|s| (s, canvases.get(s).clone())).collect();

        let start: Vec<(usize, usize)> = canvases
            .main()
            .in_bounds(x, y)
            .then_some((x as usize, y as usize))
            .into_iter()
            .collect();
        paint(canvases, target, &start, color);
        self.stroke = Some(Stroke {
            target,
            color,
            last: (x, y),
            before,
        });
        Ok(())
    }

    /// Extend the stroke to (x, y), filling the gap from the previous point
    pub fn paint_to(&mut self, x: i32, y: i32) -> AssetResult<()> {
        let canvases = self.canvases.as_mut().ok_or_else(closed)?;
        let stroke = self
            .stroke
            .as_mut()
            .ok_or_else(|| AssetError::Session("no stroke in progress".into()))?;

        let points = canvases.main().line(stroke.last, (x, y));
        paint(canvases, stroke.target, &points, stroke.color);
        stroke.last = (x, y);
        Ok(())
    }

    /// Commit the stroke as one history entry
    pub fn end_stroke(&mut self) -> AssetResult<()> {
        let canvases = self.canvases.as_ref().ok_or_else(closed)?;
        if let Some(stroke) = self.stroke.take() {
            self.history.record(canvases, stroke.before, "pencil");
        }
        Ok(())
    }

    /// Throw the stroke away and restore the canvases it touched
    pub fn cancel_stroke(&mut self) {
        if let (Some(stroke), Some(canvases)) = (self.stroke.take(), self.canvases.as_mut()) {
            for (slot, before) in stroke.before {
                *canvases.get_mut(slot) = before;
            }
        }
    }

    // One-shot tools

    pub fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgba) -> AssetResult<()> {
        let writes = self
            .canvases()?
            .main()
            .line(from, to)
            .into_iter()
            .map(|(x, y)| PixelWrite { x, y, color })
            .collect();
        self.commit(RasterDelta::Pixels(writes), "line")
    }

    /// Flood fill the region around (x, y)
    ///
    /// The region is taken from the canvas being edited (the main canvas for
    /// [`FaceTarget::All`]) and the same pixels are written to every target.
    pub fn fill(&mut self, x: usize, y: usize, color: Rgba) -> AssetResult<()> {
        let source = match self.target {
            FaceTarget::All => Slot::Main,
            FaceTarget::Face(face) => Slot::Face(face),
        };
        let region = self.canvases()?.get(source).fill_region(x, y);
        let writes = region
            .into_iter()
            .map(|(x, y)| PixelWrite { x, y, color })
            .collect();
        self.commit(RasterDelta::Pixels(writes), "fill")
    }

    /// Replace the targeted canvases with an image resized to the grid
    pub fn replace_image(&mut self, bytes: &[u8]) -> AssetResult<()> {
        let size = self.canvases()?.size();
        let img = RasterBuffer::from_image_bytes(bytes, size)?;
        self.commit(RasterDelta::Image(img), "replace")
    }

    /// Copy one face onto the current target
    pub fn copy_face(&mut self, from: TextureFace) -> AssetResult<()> {
        let img = self.canvases()?.face(from).clone();
        self.commit(RasterDelta::Image(img), "copy face")
    }

    /// Apply an arbitrary delta to the current target
    pub fn commit(&mut self, delta: RasterDelta, label: &str) -> AssetResult<()> {
        if self.stroke.is_some() {
            self.end_stroke()?;
        }
        let canvases = self.canvases.as_mut().ok_or_else(closed)?;
        self.history.commit(canvases, self.target, &delta, label)
    }

    /// Revert the latest edit; a stroke in progress is committed first and
    /// is what gets reverted
    pub fn undo(&mut self) -> AssetResult<bool> {
        if self.stroke.is_some() {
            self.end_stroke()?;
        }
        let canvases = self.canvases.as_mut().ok_or_else(closed)?;
        Ok(self.history.undo(canvases))
    }

    pub fn redo(&mut self) -> AssetResult<bool> {
        if self.stroke.is_some() {
            self.end_stroke()?;
        }
        let canvases = self.canvases.as_mut().ok_or_else(closed)?;
        Ok(self.history.redo(canvases))
    }

    /// Encode the main canvas and every face that differs from it
    pub fn export(&self) -> AssetResult<TextureExport> {
        let canvases = self.canvases()?;
        let main = canvases.main();

        let mut sides = BTreeMap::new();
        for face in TextureFace::ALL {
            let buffer = canvases.face(face);
            if buffer != main {
                sides.insert(face.face_key(), buffer.to_data_uri()?);
            }
        }
        Ok(TextureExport {
            main: main.to_data_uri()?,
            sides,
        })
    }

    /// Release the buffers; a stroke in progress is discarded
    pub fn close(&mut self) {
        if self.stroke.take().is_some() {
            log::debug!("discarding unfinished stroke");
        }
        self.canvases = None;
        self.history.clear();
    }
}

fn closed() -> AssetError {
    AssetError::Session("session is closed".into())
}

fn paint(canvases: &mut CanvasSet, target: FaceTarget, points: &[(usize, usize)], color: Rgba) {
    for slot in target.slots() {
        let buffer = canvases.get_mut(slot);
        for &(x, y) in points {
            buffer.set(x, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [255, 0, 0, 255];
    const BLUE: Rgba = [0, 0, 255, 255];

    #[test]
    fn test_stroke_is_one_entry() {
        let mut session = TextureSession::new(8, HistoryConfig::default());
        session.begin_stroke(0, 0, RED).unwrap();
        session.paint_to(3, 0).unwrap();
        session.paint_to(3, 3).unwrap();
        session.end_stroke().unwrap();

        let main = session.canvases().unwrap().main().clone();
        assert_eq!(main.get(1, 0), Some(RED));
        assert_eq!(main.get(3, 2), Some(RED));

        assert!(session.undo().unwrap());
        assert_eq!(session.canvases().unwrap().main().get(1, 0), Some([0, 0, 0, 0]));
        assert!(!session.history_state().can_undo);
    }

    #[test]
    fn test_undo_mid_stroke_reverts_only_the_stroke() {
        let mut session = TextureSession::new(4, HistoryConfig::default());
        session.draw_line((0, 0), (3, 0), RED).unwrap();
        session.begin_stroke(0, 2, BLUE).unwrap();
        session.paint_to(3, 2).unwrap();

        assert!(session.undo().unwrap());
        let main = session.canvases().unwrap().main().clone();
        assert_eq!(main.get(1, 0), Some(RED));
        assert_eq!(main.get(1, 2), Some([0, 0, 0, 0]));

        assert!(session.redo().unwrap());
        assert_eq!(session.canvases().unwrap().main().get(1, 2), Some(BLUE));
    }

    #[test]
    fn test_far_off_canvas_line_and_stroke() {
        let mut session = TextureSession::new(4, HistoryConfig::default());
        session.draw_line((i32::MIN, 1), (i32::MAX, 1), RED).unwrap();
        let main = session.canvases().unwrap().main().clone();
        assert!((0..4).all(|x| main.get(x, 1) == Some(RED)));

        session.begin_stroke(-100, 3, BLUE).unwrap();
        session.paint_to(i32::MAX, 3).unwrap();
        session.end_stroke().unwrap();
        assert_eq!(session.canvases().unwrap().main().get(3, 3), Some(BLUE));
    }

    #[test]
    fn test_cancel_stroke_restores() {
        let mut session = TextureSession::new(4, HistoryConfig::default());
        session.set_target(FaceTarget::Face(TextureFace::Top));
        session.begin_stroke(1, 1, RED).unwrap();
        session.cancel_stroke();

        assert_eq!(
            session.canvases().unwrap().face(TextureFace::Top).get(1, 1),
            Some([0, 0, 0, 0])
        );
        assert!(!session.history_state().can_undo);
        assert!(session.paint_to(2, 2).is_err());
    }

    #[test]
    fn test_fill_and_copy_face() {
        let mut session = TextureSession::new(4, HistoryConfig::default());
        session.set_target(FaceTarget::Face(TextureFace::Front));
        session.fill(0, 0, BLUE).unwrap();

        session.set_target(FaceTarget::Face(TextureFace::Back));
        session.copy_face(TextureFace::Front).unwrap();

        let canvases = session.canvases().unwrap();
        assert_eq!(canvases.face(TextureFace::Back), canvases.face(TextureFace::Front));
        assert_eq!(canvases.face(TextureFace::Back).get(3, 3), Some(BLUE));
        assert_eq!(canvases.main().get(3, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_export_only_differing_sides() {
        let mut session = TextureSession::new(4, HistoryConfig::default());
        session.draw_line((0, 0), (3, 3), RED).unwrap();
        session.set_target(FaceTarget::Face(TextureFace::Top));
        session.fill(3, 0, BLUE).unwrap();

        let export = session.export().unwrap();
        assert!(export.main.starts_with("data:image/png;base64,"));
        assert_eq!(export.sides.keys().copied().collect::<Vec<_>>(), vec![FaceKey::PosY]);
    }

    #[test]
    fn test_close_releases_and_discards() {
        let mut session = TextureSession::new(4, HistoryConfig::default());
        session.draw_line((0, 0), (1, 0), RED).unwrap();
        session.begin_stroke(2, 2, BLUE).unwrap();
        session.close();

        assert!(!session.is_open());
        assert!(session.export().is_err());
        assert!(matches!(session.undo(), Err(AssetError::Session(_))));
    }

    #[test]
    fn test_seed_from_image() {
        let mut seed = RasterBuffer::filled(2, 2, BLUE);
        seed.set(0, 0, RED);
        let png = seed.to_png().unwrap();

        let session = TextureSession::from_image(&png, 4, HistoryConfig::default()).unwrap();
        let canvases = session.canvases().unwrap();
        assert_eq!(canvases.size(), 4);
        assert_eq!(canvases.face(TextureFace::Left).get(1, 1), Some(RED));
        assert_eq!(canvases.main().get(3, 3), Some(BLUE));
        assert!(session.export().unwrap().sides.is_empty());
    }
}
