//! Cascade Deletion Engine
//!
//! Deleting an asset rewrites every placed reference to it before the record
//! itself goes away:
//!
//! ```text
//! block:        rewrite terrain → persist terrain → remove record → rebuild visuals
//! environment:  locate by id → remove records by name → filter placed objects
//!               → persist placed objects → refresh scene
//! ```
//!
//! Blocks are referenced by id, placed objects by model name. Callers confirm
//! with the user before invoking; nothing here asks again.

use crate::asset::{AssetId, BlockAsset, EnvironmentAsset, ErrorPlaceholder};
use crate::error::{AssetError, AssetResult};
use crate::registry::{AssetKind, Category, ERROR_PLACEHOLDER_ID};
use crate::scene::{self, SceneHooks};
use crate::storage::KeyValueStore;
use crate::store::AssetStore;
use crate::world::{PlacedBlock, Position};

/// Result of a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted {
        name: String,
        /// Terrain cells rewritten or placed objects dropped
        affected: usize,
    },
    /// Nothing had that id; deleting is idempotent
    NotFound,
}

/// Delete a custom block, turning its placed instances into error placeholders
///
/// If the terrain write fails the block record is still present and the
/// delete can be retried.
pub fn delete_block<S: KeyValueStore>(
    store: &mut AssetStore<S>,
    scene: &mut dyn SceneHooks,
    id: AssetId,
    error_texture: &str,
) -> AssetResult<DeleteOutcome> {
    let category = match Category::classify(AssetKind::Block, id) {
        Some(Category::CustomBlock) => Category::CustomBlock,
        Some(other) => return Err(AssetError::ReadOnlyCategory(other)),
        None => return Ok(DeleteOutcome::NotFound),
    };
    let Some(block) = store.get::<BlockAsset>(id).cloned() else {
        log::debug!("delete block {}: not found", id);
        return Ok(DeleteOutcome::NotFound);
    };

    let placeholder = ErrorPlaceholder::new(id, &block.name, error_texture);
    let mut terrain = store.terrain().clone();
    let affected = terrain.replace_references(id, &placeholder);
    if affected > 0 {
        store.replace_terrain(terrain)?;
    }

    store.remove::<BlockAsset>(category, id)?;
    log::info!(
        "deleted block \"{}\" ({}), {} placed instance(s) now {}",
        block.name,
        id,
        affected,
        placeholder.name
    );

    scene::report("rebuild_terrain_visuals", scene.rebuild_terrain_visuals());
    Ok(DeleteOutcome::Deleted {
        name: block.name,
        affected,
    })
}

/// Delete a custom environment model and every placed object using its name
pub fn delete_model<S: KeyValueStore>(
    store: &mut AssetStore<S>,
    scene: &mut dyn SceneHooks,
    id: AssetId,
) -> AssetResult<DeleteOutcome> {
    let category = match Category::classify(AssetKind::Environment, id) {
        Some(Category::CustomEnvironment) => Category::CustomEnvironment,
        Some(other) => return Err(AssetError::ReadOnlyCategory(other)),
        None => return Ok(DeleteOutcome::NotFound),
    };
    let Some(name) = store.get::<EnvironmentAsset>(id).map(|m| m.name.clone()) else {
        log::debug!("delete model {}: not found", id);
        return Ok(DeleteOutcome::NotFound);
    };

    store.remove_by_name::<EnvironmentAsset>(category, &name)?;

    let mut environment = store.environment().clone();
    let affected = environment.remove_named(&name);
    if affected > 0 {
        // A failure here leaves objects pointing at a removed model; the
        // next open drops them in `reconcile`.
        store.replace_environment(environment)?;
    }
    log::info!("deleted model \"{}\" ({}), removed {} placed object(s)", name, id, affected);

    scene::report("refresh_environment_from_db", scene.refresh_environment_from_db());
    Ok(DeleteOutcome::Deleted { name, affected })
}

/// Repairs made by [`reconcile`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    pub placeholders: Vec<Position>,
    pub dropped_objects: usize,
}

impl Reconciled {
    pub fn is_clean(&self) -> bool {
        self.placeholders.is_empty() && self.dropped_objects == 0
    }
}

/// Bring placed state back in line with the asset records
///
/// Terrain cells naming an unknown block id become placeholders called
/// `missing_block_<id>`; placed objects naming an unknown model are dropped.
/// Nothing is written when everything already matches.
pub fn reconcile<S: KeyValueStore>(store: &mut AssetStore<S>, error_texture: &str) -> AssetResult<Reconciled> {
    let mut report = Reconciled::default();

    let mut terrain = store.terrain().clone();
    let dangling: Vec<AssetId> = terrain
        .referenced_ids()
        .into_iter()
        .filter(|id| *id != ERROR_PLACEHOLDER_ID && !store.blocks().contains(*id))
        .collect();
    for id in dangling {
        report.placeholders.extend(terrain.positions_of(id));
        let placeholder = ErrorPlaceholder::new(id, &format!("block_{}", id), error_texture);
        terrain.replace_references(id, &placeholder);
    }
    if !report.placeholders.is_empty() {
        log::warn!("{} terrain cell(s) referenced deleted blocks", report.placeholders.len());
        store.replace_terrain(terrain)?;
    }

    let mut environment = store.environment().clone();
    let models = store.models();
    report.dropped_objects = environment.retain(|o| models.find_by_name(&o.name).is_some());
    if report.dropped_objects > 0 {
        log::warn!("dropped {} placed object(s) with no model", report.dropped_objects);
        store.replace_environment(environment)?;
    }

    Ok(report)
}

/// True when no placed state points at a missing asset
pub fn is_consistent<S: KeyValueStore>(store: &AssetStore<S>) -> bool {
    let blocks_ok = store.terrain().iter().all(|(_, b)| match b {
        PlacedBlock::Asset(id) => store.blocks().contains(*id),
        PlacedBlock::Missing(_) => true,
    });
    let objects_ok = store
        .environment()
        .objects()
        .iter()
        .all(|o| store.models().find_by_name(&o.name).is_some());
    blocks_ok && objects_ok
}
