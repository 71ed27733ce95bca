//! Identity Registry
//!
//! The id space is partitioned into fixed ranges, one per category:
//!
//! | category            | ids        |
//! |---------------------|------------|
//! | default blocks      | 1 – 99     |
//! | custom blocks       | 100 – 199  |
//! | default environment | 200 – 299  |
//! | custom environment  | 300 – ∞    |
//!
//! Allocation always hands out `max(existing) + 1` inside the range (or the
//! range floor when the category is empty). Callers must hold the store
//! mutably while allocating and committing, see [`crate::store::AssetStore`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::asset::AssetId;
use crate::error::{AssetError, AssetResult};

/// Reserved id of the synthetic block that replaces deleted blocks in terrain
pub const ERROR_PLACEHOLDER_ID: AssetId = 999;

/// Which record type a category holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Block,
    Environment,
}

impl AssetKind {
    pub fn label(&self) -> &'static str {
        match self {
            AssetKind::Block => "block",
            AssetKind::Environment => "environment model",
        }
    }

    /// The category newly imported assets of this kind go into
    pub fn custom_category(&self) -> Category {
        match self {
            AssetKind::Block => Category::CustomBlock,
            AssetKind::Environment => Category::CustomEnvironment,
        }
    }

    pub fn default_category(&self) -> Category {
        match self {
            AssetKind::Block => Category::DefaultBlock,
            AssetKind::Environment => Category::DefaultEnvironment,
        }
    }
}

/// Inclusive id range; `ceiling == None` means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRange {
    pub floor: AssetId,
    pub ceiling: Option<AssetId>,
}

impl IdRange {
    pub const fn bounded(floor: AssetId, ceiling: AssetId) -> Self {
        Self {
            floor,
            ceiling: Some(ceiling),
        }
    }

    pub const fn unbounded(floor: AssetId) -> Self {
        Self { floor, ceiling: None }
    }

    pub fn contains(&self, id: AssetId) -> bool {
        id >= self.floor && self.ceiling.map_or(true, |c| id <= c)
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ceiling {
            Some(c) => write!(f, "{}-{}", self.floor, c),
            None => write!(f, "{}+", self.floor),
        }
    }
}

/// One partition of the id space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    DefaultBlock,
    CustomBlock,
    DefaultEnvironment,
    CustomEnvironment,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::DefaultBlock,
        Category::CustomBlock,
        Category::DefaultEnvironment,
        Category::CustomEnvironment,
    ];

    pub fn range(&self) -> IdRange {
        match self {
            Category::DefaultBlock => IdRange::bounded(1, 99),
            Category::CustomBlock => IdRange::bounded(100, 199),
            Category::DefaultEnvironment => IdRange::bounded(200, 299),
            Category::CustomEnvironment => IdRange::unbounded(300),
        }
    }

    pub fn kind(&self) -> AssetKind {
        match self {
            Category::DefaultBlock | Category::CustomBlock => AssetKind::Block,
            Category::DefaultEnvironment | Category::CustomEnvironment => AssetKind::Environment,
        }
    }

    /// Only custom categories are persisted and writable
    pub fn is_custom(&self) -> bool {
        matches!(self, Category::CustomBlock | Category::CustomEnvironment)
    }

    /// Find the category of `kind` whose range holds `id`
    ///
    /// The error placeholder id is deliberately not classified: it is not
    /// part of the allocatable space.
    pub fn classify(kind: AssetKind, id: AssetId) -> Option<Category> {
        if kind == AssetKind::Block && id == ERROR_PLACEHOLDER_ID {
            return None;
        }
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.kind() == kind && c.range().contains(id))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::DefaultBlock => "default blocks",
            Category::CustomBlock => "custom blocks",
            Category::DefaultEnvironment => "default environment",
            Category::CustomEnvironment => "custom environment",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Next free id in `category` given the ids currently stored there
///
/// Ids outside the category's range are ignored.
pub fn allocate(category: Category, existing: impl IntoIterator<Item = AssetId>) -> AssetResult<AssetId> {
    let range = category.range();
    let max = existing.into_iter().filter(|id| range.contains(*id)).max();

    let next = match max {
        Some(max) => max.checked_add(1),
        None => Some(range.floor),
    };

    match next {
        Some(id) if range.contains(id) => Ok(id),
        _ => Err(AssetError::RangeExhausted {
            category,
            range: range.to_string(),
        }),
    }
}

/// `count` contiguous ids starting at [`allocate`]
///
/// Either every id fits in the range or nothing is allocated.
pub fn allocate_many(
    category: Category,
    existing: impl IntoIterator<Item = AssetId>,
    count: usize,
) -> AssetResult<Vec<AssetId>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let first = allocate(category, existing)?;
    let range = category.range();
    let exhausted = || AssetError::RangeExhausted {
        category,
        range: range.to_string(),
    };

    let count = AssetId::try_from(count).map_err(|_| exhausted())?;
    let last = first.checked_add(count - 1).ok_or_else(exhausted)?;
    if !range.contains(last) {
        return Err(exhausted());
    }
    Ok((first..=last).collect())
}

/// Whether `id` is stored in `category`
pub fn is_in_use(category: Category, id: AssetId, existing: impl IntoIterator<Item = AssetId>) -> bool {
    category.range().contains(id) && existing.into_iter().any(|e| e == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_empty_uses_floor() {
        assert_eq!(allocate(Category::CustomBlock, []).unwrap(), 100);
        assert_eq!(allocate(Category::CustomEnvironment, []).unwrap(), 300);
        assert_eq!(allocate(Category::DefaultBlock, []).unwrap(), 1);
    }

    #[test]
    fn test_allocate_max_plus_one() {
        // Gaps are not reused
        assert_eq!(allocate(Category::CustomBlock, [100, 105, 101]).unwrap(), 106);
        // Ids from other ranges do not count
        assert_eq!(allocate(Category::CustomBlock, [5, 250, 999]).unwrap(), 100);
    }

    #[test]
    fn test_allocate_exhausted() {
        let err = allocate(Category::CustomBlock, [199]).unwrap_err();
        assert!(matches!(err, AssetError::RangeExhausted { category: Category::CustomBlock, .. }));

        // Custom environment is unbounded
        assert_eq!(allocate(Category::CustomEnvironment, [5000]).unwrap(), 5001);
        assert!(allocate(Category::CustomEnvironment, [AssetId::MAX]).is_err());
    }

    #[test]
    fn test_allocate_many_contiguous() {
        let ids = allocate_many(Category::CustomBlock, [100, 101], 3).unwrap();
        assert_eq!(ids, vec![102, 103, 104]);

        assert!(allocate_many(Category::CustomBlock, [190], 10).is_err());
        assert_eq!(allocate_many(Category::CustomBlock, [190], 9).unwrap().last(), Some(&199));
        assert!(allocate_many(Category::CustomBlock, [], 0).unwrap().is_empty());
    }

    #[test]
    fn test_sequential_allocations_increase_within_range() {
        let mut ids = Vec::new();
        for _ in 0..100 {
            let id = allocate(Category::CustomBlock, ids.iter().copied()).unwrap();
            assert!(Category::CustomBlock.range().contains(id));
            if let Some(last) = ids.last() {
                assert!(id > *last);
            }
            ids.push(id);
        }
        assert!(allocate(Category::CustomBlock, ids.iter().copied()).is_err());
    }

    #[test]
    fn test_classify() {
        assert_eq!(Category::classify(AssetKind::Block, 42), Some(Category::DefaultBlock));
        assert_eq!(Category::classify(AssetKind::Block, 150), Some(Category::CustomBlock));
        assert_eq!(Category::classify(AssetKind::Block, 250), None);
        assert_eq!(Category::classify(AssetKind::Block, ERROR_PLACEHOLDER_ID), None);
        assert_eq!(Category::classify(AssetKind::Environment, 250), Some(Category::DefaultEnvironment));
        assert_eq!(Category::classify(AssetKind::Environment, 999), Some(Category::CustomEnvironment));
        assert_eq!(Category::classify(AssetKind::Environment, 0), None);
    }

    #[test]
    fn test_is_in_use() {
        assert!(is_in_use(Category::CustomBlock, 100, [100, 101]));
        assert!(!is_in_use(Category::CustomBlock, 102, [100, 101]));
        assert!(!is_in_use(Category::DefaultBlock, 100, [100]));
    }
}
