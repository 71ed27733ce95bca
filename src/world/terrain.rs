//! Placed-block map

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::asset::{AssetId, ErrorPlaceholder};
use crate::registry::ERROR_PLACEHOLDER_ID;

/// Integer voxel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl FromStr for Position {
    type Err = String;

    /// Parses `x,y,z`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("expected x,y,z but got \"{}\"", s));
        }
        let parse = |p: &str| p.parse::<i32>().map_err(|e| format!("bad coordinate \"{}\": {}", p, e));
        Ok(Position::new(parse(parts[0])?, parse(parts[1])?, parse(parts[2])?))
    }
}

/// What occupies a terrain cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacedBlock {
    /// A live block asset
    Asset(AssetId),
    /// A block that was deleted while placed
    Missing(ErrorPlaceholder),
}

impl PlacedBlock {
    /// The id the renderer sees: the asset id or [`ERROR_PLACEHOLDER_ID`]
    pub fn asset_id(&self) -> AssetId {
        match self {
            PlacedBlock::Asset(id) => *id,
            PlacedBlock::Missing(_) => ERROR_PLACEHOLDER_ID,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, PlacedBlock::Missing(_))
    }
}

/// Every placed block in the world
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Terrain {
    cells: BTreeMap<Position, PlacedBlock>,
}

impl Terrain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pos: Position) -> Option<&PlacedBlock> {
        self.cells.get(&pos)
    }

    /// Place a block, returning what was there before
    pub fn insert(&mut self, pos: Position, block: PlacedBlock) -> Option<PlacedBlock> {
        self.cells.insert(pos, block)
    }

    pub fn remove(&mut self, pos: Position) -> Option<PlacedBlock> {
        self.cells.remove(&pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Position, &PlacedBlock)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Positions holding the live block `id`
    pub fn positions_of(&self, id: AssetId) -> Vec<Position> {
        self.cells
            .iter()
            .filter(|(_, b)| matches!(b, PlacedBlock::Asset(a) if *a == id))
            .map(|(p, _)| *p)
            .collect()
    }

    /// Replace every cell holding block `id` with `placeholder`
    ///
    /// Other cells are untouched. Returns the number of cells rewritten.
    pub fn replace_references(&mut self, id: AssetId, placeholder: &ErrorPlaceholder) -> usize {
        let mut count = 0;
        for block in self.cells.values_mut() {
            if matches!(block, PlacedBlock::Asset(a) if *a == id) {
                *block = PlacedBlock::Missing(placeholder.clone());
                count += 1;
            }
        }
        count
    }

    /// Live ids referenced anywhere in the map (placeholders excluded)
    pub fn referenced_ids(&self) -> Vec<AssetId> {
        let mut ids: Vec<AssetId> = self
            .cells
            .values()
            .filter_map(|b| match b {
                PlacedBlock::Asset(id) => Some(*id),
                PlacedBlock::Missing(_) => None,
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

impl FromIterator<(Position, PlacedBlock)> for Terrain {
    fn from_iter<I: IntoIterator<Item = (Position, PlacedBlock)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
