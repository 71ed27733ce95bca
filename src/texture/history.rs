//! Raster Edit History
//!
//! Linear undo/redo over a [`CanvasSet`]. Each entry holds before/after
//! snapshots of every canvas it touched, so an edit applied to all faces is
//! undone and redone as one step.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::face::{CanvasSet, FaceTarget, Slot};
use super::raster::{PixelWrite, RasterBuffer};
use crate::error::{AssetError, AssetResult};

/// Change applied by one edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterDelta {
    /// Individual pixel writes
    Pixels(Vec<PixelWrite>),
    /// Replace the whole buffer
    Image(RasterBuffer),
}

/// Undo stack sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Entries kept after trimming
    pub min_states: usize,
    /// Trim once the stack grows beyond this
    pub threshold: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            min_states: 30,
            threshold: 60,
        }
    }
}

/// Availability of undo and redo, sent to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
}

#[derive(Debug, Clone)]
struct SlotChange {
    slot: Slot,
    before: RasterBuffer,
    after: RasterBuffer,
}

/// One committed edit
#[derive(Debug, Clone)]
struct HistoryEntry {
    label: String,
    changes: Vec<SlotChange>,
}

type Listener = Box<dyn FnMut(HistoryState)>;

/// Undo/redo stacks for one editing session
pub struct EditHistory {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    config: HistoryConfig,
    listeners: Vec<Listener>,
}

impl EditHistory {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            config,
            listeners: Vec::new(),
        }
    }

    /// Called synchronously after every commit, undo and redo
    pub fn subscribe(&mut self, listener: impl FnMut(HistoryState) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: !self.undo_stack.is_empty(),
            can_redo: !self.redo_stack.is_empty(),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Label of the edit `undo` would revert
    pub fn next_undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.label.as_str())
    }

    /// Apply `delta` to every canvas of `target` and record it as one entry
    pub fn commit(
        &mut self,
        canvases: &mut CanvasSet,
        target: FaceTarget,
        delta: &RasterDelta,
        label: &str,
    ) -> AssetResult<()> {
        if let RasterDelta::Image(img) = delta {
            if img.width() != canvases.size() || img.height() != canvases.size() {
                return Err(AssetError::Session(format!(
                    "image is {}x{}, canvas is {}x{}",
                    img.width(),
                    img.height(),
                    canvases.size(),
                    canvases.size()
                )));
            }
        }

        let slots = target.slots();
        let before: Vec<(Slot, RasterBuffer)> = slots.iter().map(|s| (*s, canvases.get(*s).clone())).collect();
        for slot in &slots {
            let buffer = canvases.get_mut(*slot);
            match delta {
                RasterDelta::Pixels(writes) => buffer.apply(writes),
                RasterDelta::Image(img) => *buffer = img.clone(),
            }
        }
        self.record(canvases, before, label);
        Ok(())
    }

    /// Record an edit already applied to `canvases`, given the prior contents
    /// of the canvases it touched
    ///
    /// Canvases whose contents did not change are left out of the entry; an
    /// edit that changed nothing records nothing.
    pub fn record(&mut self, canvases: &CanvasSet, before: Vec<(Slot, RasterBuffer)>, label: &str) {
        let changes: Vec<SlotChange> = before
            .into_iter()
            .filter(|(slot, before)| canvases.get(*slot) != before)
            .map(|(slot, before)| SlotChange {
                slot,
                after: canvases.get(slot).clone(),
                before,
            })
            .collect();
        if changes.is_empty() {
            log::debug!("{}: no pixels changed, nothing recorded", label);
            self.notify();
            return;
        }

        self.redo_stack.clear();
        self.undo_stack.push(HistoryEntry {
            label: label.to_string(),
            changes,
        });

        if self.undo_stack.len() > self.config.threshold {
            let excess = self.undo_stack.len() - self.config.min_states.min(self.config.threshold);
            self.undo_stack.drain(..excess);
            log::debug!("trimmed {} oldest history entries", excess);
        }
        self.notify();
    }

    /// Revert the latest edit; false if there was nothing to undo
    pub fn undo(&mut self, canvases: &mut CanvasSet) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            log::debug!("nothing to undo");
            self.notify();
            return false;
        };
        for change in &entry.changes {
            *canvases.get_mut(change.slot) = change.before.clone();
        }
        self.redo_stack.push(entry);
        self.notify();
        true
    }

    /// Reapply the latest undone edit; false if there was nothing to redo
    pub fn redo(&mut self, canvases: &mut CanvasSet) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            log::debug!("nothing to redo");
            self.notify();
            return false;
        };
        for change in &entry.changes {
            *canvases.get_mut(change.slot) = change.after.clone();
        }
        self.undo_stack.push(entry);
        self.notify();
        true
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.notify();
    }

    fn notify(&mut self) {
        let state = self.state();
        for listener in self.listeners.iter_mut() {
            listener(state);
        }
    }
}

impl fmt::Debug for EditHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditHistory")
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::face::TextureFace;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn red_dot() -> RasterDelta {
        RasterDelta::Pixels(vec![PixelWrite {
            x: 1,
            y: 1,
            color: [255, 0, 0, 255],
        }])
    }

    #[test]
    fn test_all_faces_undo_redo_exact() {
        let mut canvases = CanvasSet::new(4);
        // Faces start out different from each other
        canvases
            .get_mut(Slot::Face(TextureFace::Top))
            .set(0, 0, [0, 255, 0, 255]);
        let original = canvases.clone();

        let mut history = EditHistory::new(HistoryConfig::default());
        history.commit(&mut canvases, FaceTarget::All, &red_dot(), "pencil").unwrap();
        for slot in Slot::ALL {
            assert_eq!(canvases.get(slot).get(1, 1), Some([255, 0, 0, 255]));
        }
        let edited = canvases.clone();

        assert!(history.undo(&mut canvases));
        assert_eq!(canvases, original);

        assert!(history.redo(&mut canvases));
        assert_eq!(canvases, edited);
    }

    #[test]
    fn test_single_face_commit() {
        let mut canvases = CanvasSet::new(4);
        let mut history = EditHistory::new(HistoryConfig::default());
        history
            .commit(&mut canvases, FaceTarget::Face(TextureFace::Left), &red_dot(), "pencil")
            .unwrap();

        assert_eq!(canvases.face(TextureFace::Left).get(1, 1), Some([255, 0, 0, 255]));
        assert_eq!(canvases.face(TextureFace::Right).get(1, 1), Some([0, 0, 0, 0]));
        assert_eq!(canvases.main().get(1, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_new_commit_clears_redo() {
        let mut canvases = CanvasSet::new(4);
        let mut history = EditHistory::new(HistoryConfig::default());
        history.commit(&mut canvases, FaceTarget::All, &red_dot(), "a").unwrap();
        history.undo(&mut canvases);
        assert!(history.can_redo());

        history
            .commit(&mut canvases, FaceTarget::All, &RasterDelta::Image(RasterBuffer::filled(4, 4, [9, 9, 9, 255])), "b")
            .unwrap();
        assert!(!history.can_redo());
        assert!(!history.redo(&mut canvases));
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut canvases = CanvasSet::new(2);
        let before = canvases.clone();
        let mut history = EditHistory::new(HistoryConfig::default());
        assert!(!history.undo(&mut canvases));
        assert!(!history.redo(&mut canvases));
        assert_eq!(canvases, before);
    }

    #[test]
    fn test_listeners_see_every_transition() {
        let states = Rc::new(RefCell::new(Vec::new()));
        let mut history = EditHistory::new(HistoryConfig::default());
        {
            let states = states.clone();
            history.subscribe(move |s| states.borrow_mut().push(s));
        }

        let mut canvases = CanvasSet::new(4);
        history.commit(&mut canvases, FaceTarget::All, &red_dot(), "a").unwrap();
        history.undo(&mut canvases);
        history.redo(&mut canvases);

        let s = |u, r| HistoryState {
            can_undo: u,
            can_redo: r,
        };
        assert_eq!(*states.borrow(), vec![s(true, false), s(false, true), s(true, false)]);
    }

    #[test]
    fn test_trim_to_min_states() {
        let config = HistoryConfig {
            min_states: 3,
            threshold: 5,
        };
        let mut history = EditHistory::new(config);
        let mut canvases = CanvasSet::new(8);

        for i in 0..6u8 {
            let delta = RasterDelta::Pixels(vec![PixelWrite {
                x: i as usize,
                y: 0,
                color: [i + 1, 0, 0, 255],
            }]);
            history.commit(&mut canvases, FaceTarget::All, &delta, "dot").unwrap();
        }
        // Sixth commit crossed the threshold
        assert_eq!(history.undo_len(), 3);

        let mut undone = 0;
        while history.undo(&mut canvases) {
            undone += 1;
        }
        assert_eq!(undone, 3);
        // The three oldest dots can no longer be undone
        assert_eq!(canvases.main().get(2, 0), Some([3, 0, 0, 255]));
        assert_eq!(canvases.main().get(3, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_image_size_mismatch() {
        let mut canvases = CanvasSet::new(4);
        let mut history = EditHistory::new(HistoryConfig::default());
        let err = history
            .commit(&mut canvases, FaceTarget::All, &RasterDelta::Image(RasterBuffer::new(3, 3)), "replace")
            .unwrap_err();
        assert!(matches!(err, AssetError::Session(_)));
        assert!(!history.can_undo());
    }
}
