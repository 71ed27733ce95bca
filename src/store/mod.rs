//! Asset Store
//!
//! Single source of truth for custom assets and the world state that refers
//! to them. Every mutation follows the same order:
//!
//! 1. build the next value from the current one
//! 2. persist it as a whole through the [`KeyValueStore`]
//! 3. only then swap it into memory
//! 4. notify subscribers
//!
//! A rejected write therefore leaves memory untouched, memory is never ahead
//! of durable state.

mod catalog;
mod events;

use std::collections::HashSet;

use crate::asset::{default_blocks, default_models, AssetId, AssetRecord, BlockAsset, EnvironmentAsset};
use crate::error::{AssetError, AssetResult};
use crate::registry::{self, AssetKind, Category};
use crate::storage::{load_value, save_value, Collection, KeyValueStore};
use crate::world::{EnvironmentState, PlacedBlock, PlacedObject, Position, Terrain};

pub use catalog::{Catalog, Cataloged, Catalogs};
pub use events::{AssetEvent, SubscriptionId, Subscribers};

/// Key of the terrain and environment values
pub const CURRENT_KEY: &str = "current";

/// Default cap on placed environment objects
pub const MAX_ENVIRONMENT_OBJECTS: usize = 5000;

/// Durable asset registry plus placed-object state
pub struct AssetStore<S> {
    storage: S,
    catalogs: Catalogs,
    terrain: Terrain,
    environment: EnvironmentState,
    environment_limit: usize,
    subscribers: Subscribers,
}

impl<S: KeyValueStore> AssetStore<S> {
    /// Load every collection from `storage`
    ///
    /// A stored record whose id lies outside its custom range is a fatal
    /// configuration error.
    pub fn open(storage: S) -> AssetResult<Self> {
        let blocks: Vec<BlockAsset> = load_custom(&storage)?;
        let models: Vec<EnvironmentAsset> = load_custom(&storage)?;

        let terrain: Terrain = load_value(&storage, Collection::Terrain, CURRENT_KEY)
            .map_err(|e| AssetError::persistence("load terrain", e))?
            .unwrap_or_default();
        let environment: EnvironmentState = load_value(&storage, Collection::Environment, CURRENT_KEY)
            .map_err(|e| AssetError::persistence("load environment", e))?
            .unwrap_or_default();

        log::info!(
            "opened store: {} custom block(s), {} custom model(s), {} placed block(s), {} placed object(s)",
            blocks.len(),
            models.len(),
            terrain.len(),
            environment.len()
        );

        Ok(Self {
            storage,
            catalogs: Catalogs {
                blocks: Catalog::new(default_blocks(), blocks),
                models: Catalog::new(default_models(), models),
            },
            terrain,
            environment,
            environment_limit: MAX_ENVIRONMENT_OBJECTS,
            subscribers: Subscribers::new(),
        })
    }

    pub fn with_environment_limit(mut self, limit: usize) -> Self {
        self.environment_limit = limit;
        self
    }

    pub fn environment_limit(&self) -> usize {
        self.environment_limit
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn blocks(&self) -> &Catalog<BlockAsset> {
        &self.catalogs.blocks
    }

    pub fn models(&self) -> &Catalog<EnvironmentAsset> {
        &self.catalogs.models
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn environment(&self) -> &EnvironmentState {
        &self.environment
    }

    // Subscriptions

    pub fn subscribe(&mut self, listener: impl FnMut(&AssetEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // Identity

    /// Ids currently stored in `category`
    pub fn ids_in(&self, category: Category) -> Vec<AssetId> {
        let range = category.range();
        let ids: Vec<AssetId> = match category.kind() {
            AssetKind::Block => self.catalogs.blocks.ids().collect(),
            AssetKind::Environment => self.catalogs.models.ids().collect(),
        };
        ids.into_iter().filter(|id| range.contains(*id)).collect()
    }

    pub fn allocate(&self, category: Category) -> AssetResult<AssetId> {
        let id = registry::allocate(category, self.ids_in(category))?;
        log::debug!("allocated id {} in {}", id, category);
        Ok(id)
    }

    pub fn allocate_many(&self, category: Category, count: usize) -> AssetResult<Vec<AssetId>> {
        let ids = registry::allocate_many(category, self.ids_in(category), count)?;
        log::debug!("allocated {} id(s) in {}: {:?}", ids.len(), category, ids);
        Ok(ids)
    }

    pub fn is_in_use(&self, category: Category, id: AssetId) -> bool {
        registry::is_in_use(category, id, self.ids_in(category))
    }

    // Records

    /// Records of `category` (empty if `A` is not of the category's kind)
    pub fn list<A: Cataloged>(&self, category: Category) -> Vec<&A> {
        A::catalog(&self.catalogs).in_category(category).collect()
    }

    pub fn get<A: Cataloged>(&self, id: AssetId) -> Option<&A> {
        A::catalog(&self.catalogs).get(id)
    }

    /// Insert or replace a record by id
    pub fn upsert<A: Cataloged>(&mut self, category: Category, record: A) -> AssetResult<()> {
        self.upsert_many(category, vec![record])
    }

    /// Insert or replace several records with one write and one event
    ///
    /// Either every record is committed or none is: a duplicate name (against
    /// stored records or within `records`) fails the whole call before any
    /// write.
    pub fn upsert_many<A: Cataloged>(&mut self, category: Category, records: Vec<A>) -> AssetResult<()> {
        check_writable::<A>(category)?;
        if records.is_empty() {
            return Ok(());
        }

        let catalog = A::catalog(&self.catalogs);
        let mut batch_names = HashSet::new();
        for record in &records {
            if !category.range().contains(record.id()) {
                return Err(AssetError::IdOutOfRange {
                    category,
                    id: record.id(),
                });
            }
            if !batch_names.insert(record.name()) {
                return Err(AssetError::DuplicateName {
                    category,
                    name: record.name().to_string(),
                });
            }
            if let Some(existing) = catalog.find_by_name(record.name()) {
                if existing.id() != record.id() {
                    let holder = Category::classify(A::KIND, existing.id()).unwrap_or(category);
                    return Err(AssetError::DuplicateName {
                        category: holder,
                        name: record.name().to_string(),
                    });
                }
            }
        }

        let ids: Vec<AssetId> = records.iter().map(|r| r.id()).collect();
        let mut next = catalog.custom_snapshot();
        for record in records {
            match next.iter_mut().find(|r| r.id() == record.id()) {
                Some(slot) => *slot = record,
                None => next.push(record),
            }
        }

        self.commit_custom(next, "upsert")?;
        self.subscribers.emit(&AssetEvent::Upserted { category, ids });
        Ok(())
    }

    /// Remove a record by id
    pub fn remove<A: Cataloged>(&mut self, category: Category, id: AssetId) -> AssetResult<A> {
        check_writable::<A>(category)?;

        let catalog = A::catalog(&self.catalogs);
        let removed = match catalog.custom().find(|r| r.id() == id) {
            Some(record) if category.range().contains(id) => record.clone(),
            _ => return Err(AssetError::NotFound { category, id }),
        };
        let next: Vec<A> = catalog.custom().filter(|r| r.id() != id).cloned().collect();

        self.commit_custom(next, "remove")?;
        self.subscribers.emit(&AssetEvent::Removed {
            category,
            ids: vec![id],
        });
        Ok(removed)
    }

    /// Remove every record of `category` named exactly `name`
    ///
    /// Returns the removed records; an empty result means nothing was written.
    pub fn remove_by_name<A: Cataloged>(&mut self, category: Category, name: &str) -> AssetResult<Vec<A>> {
        check_writable::<A>(category)?;

        let range = category.range();
        let (removed, next): (Vec<A>, Vec<A>) = A::catalog(&self.catalogs)
            .custom()
            .cloned()
            .partition(|r| r.name() == name && range.contains(r.id()));
        if removed.is_empty() {
            return Ok(removed);
        }

        self.commit_custom(next, "remove by name")?;
        self.subscribers.emit(&AssetEvent::Removed {
            category,
            ids: removed.iter().map(|r| r.id()).collect(),
        });
        Ok(removed)
    }

    fn commit_custom<A: Cataloged>(&mut self, next: Vec<A>, operation: &str) -> AssetResult<()> {
        save_value(&mut self.storage, A::COLLECTION, A::KEY, &next)
            .map_err(|e| AssetError::persistence(format!("{} {}", operation, A::COLLECTION), e))?;
        A::catalog_mut(&mut self.catalogs).replace_custom(next);
        Ok(())
    }

    // World state

    /// Persist `terrain` as a whole, then make it current
    pub fn replace_terrain(&mut self, terrain: Terrain) -> AssetResult<()> {
        save_value(&mut self.storage, Collection::Terrain, CURRENT_KEY, &terrain)
            .map_err(|e| AssetError::persistence("save terrain", e))?;
        self.terrain = terrain;
        self.subscribers.emit(&AssetEvent::TerrainChanged);
        Ok(())
    }

    /// Persist `environment` as a whole, then make it current
    pub fn replace_environment(&mut self, environment: EnvironmentState) -> AssetResult<()> {
        save_value(&mut self.storage, Collection::Environment, CURRENT_KEY, &environment)
            .map_err(|e| AssetError::persistence("save environment", e))?;
        self.environment = environment;
        self.subscribers.emit(&AssetEvent::EnvironmentChanged);
        Ok(())
    }

    /// Place a live block at `pos`
    pub fn place_block(&mut self, pos: Position, id: AssetId) -> AssetResult<()> {
        if !self.catalogs.blocks.contains(id) {
            let category = Category::classify(AssetKind::Block, id).unwrap_or(Category::CustomBlock);
            return Err(AssetError::NotFound { category, id });
        }
        let mut next = self.terrain.clone();
        next.insert(pos, PlacedBlock::Asset(id));
        self.replace_terrain(next)
    }

    /// Clear the cell at `pos`, returning what was there
    pub fn clear_block(&mut self, pos: Position) -> AssetResult<Option<PlacedBlock>> {
        if self.terrain.get(pos).is_none() {
            return Ok(None);
        }
        let mut next = self.terrain.clone();
        let removed = next.remove(pos);
        self.replace_terrain(next)?;
        Ok(removed)
    }

    /// Append a placed object referencing a live model by name
    pub fn place_object(&mut self, object: PlacedObject) -> AssetResult<()> {
        if self.catalogs.models.find_by_name(&object.name).is_none() {
            return Err(AssetError::UnknownName {
                kind: AssetKind::Environment,
                name: object.name,
            });
        }
        let mut next = self.environment.clone();
        next.push(object, self.environment_limit)?;
        self.replace_environment(next)
    }
}

fn check_writable<A: AssetRecord>(category: Category) -> AssetResult<()> {
    if !category.is_custom() {
        return Err(AssetError::ReadOnlyCategory(category));
    }
    if category.kind() != A::KIND {
        return Err(AssetError::IdOutOfRange { category, id: 0 });
    }
    Ok(())
}

fn load_custom<A: AssetRecord>(storage: &impl KeyValueStore) -> AssetResult<Vec<A>> {
    let records: Vec<A> = load_value(storage, A::COLLECTION, A::KEY)
        .map_err(|e| AssetError::persistence(format!("load {}", A::COLLECTION), e))?
        .unwrap_or_default();

    let category = A::KIND.custom_category();
    for record in &records {
        if !category.range().contains(record.id()) {
            return Err(AssetError::IdOutOfRange {
                category,
                id: record.id(),
            });
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::world::Transform;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn open_empty() -> AssetStore<MemoryStorage> {
        AssetStore::open(MemoryStorage::new()).unwrap()
    }

    fn block(id: AssetId, name: &str) -> BlockAsset {
        BlockAsset::custom(id, name, "data:image/png;base64,AA==")
    }

    #[test]
    fn test_upsert_then_reload() {
        let mut store = open_empty();
        let id = store.allocate(Category::CustomBlock).unwrap();
        assert_eq!(id, 100);
        store.upsert(Category::CustomBlock, block(id, "mossy")).unwrap();

        let reopened = AssetStore::open(store.into_storage()).unwrap();
        assert_eq!(reopened.get::<BlockAsset>(100).map(|b| b.name.as_str()), Some("mossy"));
        assert_eq!(reopened.allocate(Category::CustomBlock).unwrap(), 101);
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let mut store = open_empty();
        store.upsert(Category::CustomBlock, block(100, "mossy")).unwrap();
        store.upsert(Category::CustomBlock, block(100, "mossier")).unwrap();

        let custom = store.list::<BlockAsset>(Category::CustomBlock);
        assert_eq!(custom.len(), 1);
        assert_eq!(custom[0].name, "mossier");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut store = open_empty();
        store.upsert(Category::CustomBlock, block(100, "mossy")).unwrap();

        let err = store.upsert(Category::CustomBlock, block(101, "mossy")).unwrap_err();
        assert!(matches!(err, AssetError::DuplicateName { .. }));

        // Default names are taken too
        let err = store.upsert(Category::CustomBlock, block(101, "grass")).unwrap_err();
        assert!(matches!(
            err,
            AssetError::DuplicateName {
                category: Category::DefaultBlock,
                ..
            }
        ));
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let mut store = open_empty();
        let writes_before = store.storage().write_count();

        let err = store
            .upsert_many(Category::CustomBlock, vec![block(100, "a"), block(101, "b"), block(102, "a")])
            .unwrap_err();
        assert!(matches!(err, AssetError::DuplicateName { .. }));
        assert!(store.list::<BlockAsset>(Category::CustomBlock).is_empty());
        assert_eq!(store.storage().write_count(), writes_before);

        store
            .upsert_many(Category::CustomBlock, vec![block(100, "a"), block(101, "b")])
            .unwrap();
        assert_eq!(store.storage().write_count(), writes_before + 1);
        assert_eq!(store.list::<BlockAsset>(Category::CustomBlock).len(), 2);
    }

    #[test]
    fn test_defaults_are_read_only() {
        let mut store = open_empty();
        let err = store.upsert(Category::DefaultBlock, block(50, "mine")).unwrap_err();
        assert!(matches!(err, AssetError::ReadOnlyCategory(Category::DefaultBlock)));

        let err = store.remove::<BlockAsset>(Category::DefaultBlock, 1).unwrap_err();
        assert!(matches!(err, AssetError::ReadOnlyCategory(_)));
    }

    #[test]
    fn test_id_out_of_range() {
        let mut store = open_empty();
        let err = store.upsert(Category::CustomBlock, block(250, "far")).unwrap_err();
        assert!(matches!(err, AssetError::IdOutOfRange { id: 250, .. }));
    }

    #[test]
    fn test_rejected_write_keeps_memory() {
        let mut store = open_empty();
        store.upsert(Category::CustomBlock, block(100, "mossy")).unwrap();

        store.storage_mut().reject_writes(Collection::CustomBlocks);
        let err = store.upsert(Category::CustomBlock, block(101, "cracked")).unwrap_err();
        assert!(matches!(err, AssetError::Persistence { .. }));
        assert!(store.get::<BlockAsset>(101).is_none());

        let err = store.remove::<BlockAsset>(Category::CustomBlock, 100).unwrap_err();
        assert!(matches!(err, AssetError::Persistence { .. }));
        assert!(store.get::<BlockAsset>(100).is_some());
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let mut store = open_empty();
        let err = store.remove::<BlockAsset>(Category::CustomBlock, 150).unwrap_err();
        assert!(matches!(err, AssetError::NotFound { id: 150, .. }));
    }

    #[test]
    fn test_events_once_per_commit() {
        let mut store = open_empty();
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            store.subscribe(move |e| seen.borrow_mut().push(e.clone()));
        }

        store
            .upsert_many(Category::CustomBlock, vec![block(100, "a"), block(101, "b")])
            .unwrap();
        store.remove::<BlockAsset>(Category::CustomBlock, 100).unwrap();
        // Failed commits emit nothing
        let _ = store.upsert(Category::CustomBlock, block(102, "b"));

        assert_eq!(
            *seen.borrow(),
            vec![
                AssetEvent::Upserted {
                    category: Category::CustomBlock,
                    ids: vec![100, 101]
                },
                AssetEvent::Removed {
                    category: Category::CustomBlock,
                    ids: vec![100]
                },
            ]
        );
    }

    #[test]
    fn test_open_rejects_out_of_range_records() {
        let mut storage = MemoryStorage::new();
        save_value(&mut storage, Collection::CustomBlocks, "blocks", &vec![block(5, "sneaky")]).unwrap();
        let err = AssetStore::open(storage).err().unwrap();
        assert!(matches!(err, AssetError::IdOutOfRange { id: 5, .. }));
    }

    #[test]
    fn test_place_block_and_object() {
        let mut store = open_empty();
        store.place_block(Position::new(0, 0, 0), 1).unwrap();
        assert!(store.place_block(Position::new(0, 1, 0), 150).is_err());

        store
            .place_object(PlacedObject::new("oak_tree", Transform::default()))
            .unwrap();
        let err = store
            .place_object(PlacedObject::new("ghost", Transform::default()))
            .unwrap_err();
        assert!(matches!(err, AssetError::UnknownName { .. }));

        let reopened = AssetStore::open(store.into_storage()).unwrap();
        assert_eq!(reopened.terrain().len(), 1);
        assert_eq!(reopened.environment().len(), 1);
    }

    #[test]
    fn test_environment_limit() {
        let mut store = open_empty().with_environment_limit(1);
        store.place_object(PlacedObject::new("rock", Transform::default())).unwrap();
        let err = store
            .place_object(PlacedObject::new("rock", Transform::default()))
            .unwrap_err();
        assert!(matches!(err, AssetError::EnvironmentFull { limit: 1 }));
    }

    #[test]
    fn test_remove_by_name() {
        let mut store = open_empty();
        store
            .upsert(Category::CustomEnvironment, EnvironmentAsset::custom(300, "robot", vec![1, 2]))
            .unwrap();

        let removed = store
            .remove_by_name::<EnvironmentAsset>(Category::CustomEnvironment, "robot")
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert!(store.get::<EnvironmentAsset>(300).is_none());
        assert!(store
            .remove_by_name::<EnvironmentAsset>(Category::CustomEnvironment, "robot")
            .unwrap()
            .is_empty());
    }
}
