//! In-memory view of one asset kind: built-in defaults plus custom records

use std::collections::BTreeMap;

use crate::asset::{AssetId, AssetRecord, BlockAsset, EnvironmentAsset};
use crate::registry::Category;

/// All records of one kind, keyed by id
///
/// Defaults are fixed at construction. Custom records change only through
/// [`Catalog::replace_custom`], after the new list has been persisted.
#[derive(Debug, Clone)]
pub struct Catalog<A> {
    defaults: BTreeMap<AssetId, A>,
    custom: BTreeMap<AssetId, A>,
}

impl<A: AssetRecord> Catalog<A> {
    pub fn new(defaults: Vec<A>, custom: Vec<A>) -> Self {
        Self {
            defaults: defaults.into_iter().map(|a| (a.id(), a)).collect(),
            custom: custom.into_iter().map(|a| (a.id(), a)).collect(),
        }
    }

    pub fn get(&self, id: AssetId) -> Option<&A> {
        self.custom.get(&id).or_else(|| self.defaults.get(&id))
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.get(id).is_some()
    }

    /// Exact name lookup
    pub fn find_by_name(&self, name: &str) -> Option<&A> {
        self.iter().find(|a| a.name() == name)
    }

    /// ASCII case-insensitive name lookup
    pub fn find_by_name_ignore_case(&self, name: &str) -> Option<&A> {
        self.iter().find(|a| a.name().eq_ignore_ascii_case(name))
    }

    /// Defaults first, then custom records, each in id order
    pub fn iter(&self) -> impl Iterator<Item = &A> {
        self.defaults.values().chain(self.custom.values())
    }

    pub fn defaults(&self) -> impl Iterator<Item = &A> {
        self.defaults.values()
    }

    pub fn custom(&self) -> impl Iterator<Item = &A> {
        self.custom.values()
    }

    /// Records whose id falls in `category`
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &A> {
        let range = category.range();
        let matches_kind = category.kind() == A::KIND;
        self.iter().filter(move |a| matches_kind && range.contains(a.id()))
    }

    pub fn ids(&self) -> impl Iterator<Item = AssetId> + '_ {
        self.defaults.keys().chain(self.custom.keys()).copied()
    }

    pub fn len(&self) -> usize {
        self.defaults.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Custom list as it will be written to storage
    pub fn custom_snapshot(&self) -> Vec<A> {
        self.custom.values().cloned().collect()
    }

    pub(crate) fn replace_custom(&mut self, records: Vec<A>) {
        self.custom = records.into_iter().map(|a| (a.id(), a)).collect();
    }
}

/// Both catalogs held by a store
#[derive(Debug, Clone)]
pub struct Catalogs {
    pub blocks: Catalog<BlockAsset>,
    pub models: Catalog<EnvironmentAsset>,
}

/// Record types the store knows how to route to their catalog
pub trait Cataloged: AssetRecord {
    fn catalog(catalogs: &Catalogs) -> &Catalog<Self>;
    fn catalog_mut(catalogs: &mut Catalogs) -> &mut Catalog<Self>;
}

impl Cataloged for BlockAsset {
    fn catalog(catalogs: &Catalogs) -> &Catalog<Self> {
        &catalogs.blocks
    }

    fn catalog_mut(catalogs: &mut Catalogs) -> &mut Catalog<Self> {
        &mut catalogs.blocks
    }
}

impl Cataloged for EnvironmentAsset {
    fn catalog(catalogs: &Catalogs) -> &Catalog<Self> {
        &catalogs.models
    }

    fn catalog_mut(catalogs: &mut Catalogs) -> &mut Catalog<Self> {
        &mut catalogs.models
    }
}
