//! Asset manager service object
//!
//! Bundles the store, the scene hooks, the configuration and the user's
//! current selection. Everything that mutates goes through `&mut self`, which
//! serializes imports and deletions against each other.

use rand::Rng;

use crate::asset::{AssetId, BlockAsset, EnvironmentAsset};
use crate::cascade::{self, DeleteOutcome, Reconciled};
use crate::config::EditorConfig;
use crate::error::{AssetError, AssetResult};
use crate::import::{self, DroppedFile, ImportReport, ImportTab};
use crate::registry::{AssetKind, Category};
use crate::scene::SceneHooks;
use crate::storage::KeyValueStore;
use crate::store::{AssetEvent, AssetStore, SubscriptionId};
use crate::texture::{TextureSession, TextureExport};
use crate::world::{PlacedObject, Position, Transform};

/// Active tab and highlighted asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub tab: ImportTab,
    pub selected: Option<AssetId>,
}

pub struct AssetManager<S> {
    store: AssetStore<S>,
    scene: Box<dyn SceneHooks>,
    config: EditorConfig,
    selection: Selection,
}

impl<S: KeyValueStore> AssetManager<S> {
    /// Open the store and repair any placed state left dangling by an
    /// interrupted operation
    pub fn open(storage: S, scene: Box<dyn SceneHooks>, config: EditorConfig) -> AssetResult<Self> {
        let mut store = AssetStore::open(storage)?.with_environment_limit(config.max_environment_objects);

        let repaired = cascade::reconcile(&mut store, &config.error_texture_uri)?;
        if !repaired.is_clean() {
            log::warn!(
                "repaired {} terrain cell(s) and {} placed object(s) on open",
                repaired.placeholders.len(),
                repaired.dropped_objects
            );
        }

        let mut manager = Self {
            store,
            scene,
            config,
            selection: Selection {
                tab: ImportTab::Blocks,
                selected: None,
            },
        };
        manager.selection.selected = manager.first_default(ImportTab::Blocks);
        Ok(manager)
    }

    pub fn store(&self) -> &AssetStore<S> {
        &self.store
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&AssetEvent) + 'static) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Switch tabs; the selection moves to the tab's first default asset
    pub fn set_tab(&mut self, tab: ImportTab) {
        if self.selection.tab != tab {
            self.selection = Selection {
                tab,
                selected: self.first_default(tab),
            };
        }
    }

    /// Select an asset of the active tab
    pub fn select(&mut self, id: AssetId) -> AssetResult<()> {
        let exists = match self.selection.tab {
            ImportTab::Blocks => self.store.blocks().contains(id),
            ImportTab::Environment => self.store.models().contains(id),
        };
        if !exists {
            let kind = tab_kind(self.selection.tab);
            let category = Category::classify(kind, id).unwrap_or(kind.custom_category());
            return Err(AssetError::NotFound { category, id });
        }
        self.selection.selected = Some(id);
        Ok(())
    }

    pub fn import(&mut self, tab: ImportTab, files: Vec<DroppedFile>) -> AssetResult<ImportReport> {
        import::import_files(&mut self.store, self.scene.as_mut(), tab, files)
    }

    pub fn delete_block(&mut self, id: AssetId) -> AssetResult<DeleteOutcome> {
        let outcome = cascade::delete_block(&mut self.store, self.scene.as_mut(), id, &self.config.error_texture_uri)?;
        self.after_delete(ImportTab::Blocks, id, &outcome);
        Ok(outcome)
    }

    pub fn delete_model(&mut self, id: AssetId) -> AssetResult<DeleteOutcome> {
        let outcome = cascade::delete_model(&mut self.store, self.scene.as_mut(), id)?;
        self.after_delete(ImportTab::Environment, id, &outcome);
        Ok(outcome)
    }

    /// Run load-time repairs again, e.g. after an external edit
    pub fn reconcile(&mut self) -> AssetResult<Reconciled> {
        cascade::reconcile(&mut self.store, &self.config.error_texture_uri)
    }

    /// Blank texture session sized from the config
    pub fn new_texture_session(&self) -> TextureSession {
        TextureSession::new(self.config.texture_grid_size, self.config.history)
    }

    /// Texture session seeded from an image
    pub fn texture_session_from_image(&self, bytes: &[u8]) -> AssetResult<TextureSession> {
        TextureSession::from_image(bytes, self.config.texture_grid_size, self.config.history)
    }

    /// Save a finished session as a new block and select it
    pub fn save_texture(&mut self, name: Option<&str>, texture: TextureExport) -> AssetResult<BlockAsset> {
        let block = import::import_generated(&mut self.store, name, texture)?;
        self.selection = Selection {
            tab: ImportTab::Blocks,
            selected: Some(block.id),
        };
        Ok(block)
    }

    pub fn place_block(&mut self, pos: Position, id: AssetId) -> AssetResult<()> {
        self.store.place_block(pos, id)?;
        crate::scene::report("rebuild_terrain_visuals", self.scene.rebuild_terrain_visuals());
        Ok(())
    }

    /// Place a model using the configured scale/rotation settings
    pub fn place_object(&mut self, name: &str, position: [f32; 3], rng: &mut impl Rng) -> AssetResult<PlacedObject> {
        let (scale, rotation) = self.config.placement.sample(rng);
        let object = PlacedObject::new(
            name,
            Transform {
                position,
                rotation,
                scale,
            },
        );
        self.store.place_object(object.clone())?;
        crate::scene::report("refresh_environment_from_db", self.scene.refresh_environment_from_db());
        Ok(object)
    }

    fn after_delete(&mut self, tab: ImportTab, id: AssetId, outcome: &DeleteOutcome) {
        if matches!(outcome, DeleteOutcome::Deleted { .. })
            && self.selection.tab == tab
            && self.selection.selected == Some(id)
        {
            self.selection.selected = self.first_default(tab);
            log::debug!("selection reset to {:?}", self.selection.selected);
        }
    }

    fn first_default(&self, tab: ImportTab) -> Option<AssetId> {
        match tab {
            ImportTab::Blocks => self.store.blocks().defaults().map(|b: &BlockAsset| b.id).next(),
            ImportTab::Environment => self.store.models().defaults().map(|m: &EnvironmentAsset| m.id).next(),
        }
    }
}

fn tab_kind(tab: ImportTab) -> AssetKind {
    match tab {
        ImportTab::Blocks => AssetKind::Block,
        ImportTab::Environment => AssetKind::Environment,
    }
}
