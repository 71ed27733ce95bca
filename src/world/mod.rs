//! World state that references assets
//!
//! - [`Terrain`]: position → placed block, references blocks by id
//! - [`EnvironmentState`]: ordered placed objects, references models by name
//! - [`PlacementSettings`]: scale/rotation applied to newly placed objects
//!
//! Both state collections are persisted whole, never incrementally.

mod environment;
mod placement;
mod terrain;

pub use environment::{EnvironmentState, PlacedObject, Transform};
pub use placement::PlacementSettings;
pub use terrain::{PlacedBlock, Position, Terrain};
