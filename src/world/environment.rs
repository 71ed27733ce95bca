//! Placed environment objects

use serde::{Deserialize, Serialize};

use crate::error::{AssetError, AssetResult};

/// Where and how an object sits in the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f32; 3],
    /// Degrees around the vertical axis
    pub rotation: f32,
    /// Uniform scale
    pub scale: f32,
}

impl Transform {
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

/// One placed instance of an environment model, referenced by model name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject {
    pub name: String,
    pub transform: Transform,
}

impl PlacedObject {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
        }
    }
}

/// Ordered list of placed objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentState {
    objects: Vec<PlacedObject>,
}

impl EnvironmentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> &[PlacedObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Append an object unless the list already holds `limit` entries
    pub fn push(&mut self, object: PlacedObject, limit: usize) -> AssetResult<()> {
        if self.objects.len() >= limit {
            return Err(AssetError::EnvironmentFull { limit });
        }
        self.objects.push(object);
        Ok(())
    }

    /// Drop every object named `name`, keeping the order of the rest
    pub fn remove_named(&mut self, name: &str) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| o.name != name);
        before - self.objects.len()
    }

    /// Keep only objects for which `keep` returns true
    pub fn retain(&mut self, keep: impl FnMut(&PlacedObject) -> bool) -> usize {
        let before = self.objects.len();
        self.objects.retain(keep);
        before - self.objects.len()
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.objects.iter().filter(|o| o.name == name).count()
    }
}

impl FromIterator<PlacedObject> for EnvironmentState {
    fn from_iter<I: IntoIterator<Item = PlacedObject>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_named_keeps_order() {
        let mut env: EnvironmentState = ["tree", "robot", "rock", "robot"]
            .into_iter()
            .map(|n| PlacedObject::new(n, Transform::default()))
            .collect();

        assert_eq!(env.remove_named("robot"), 2);
        let names: Vec<&str> = env.objects().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["tree", "rock"]);
        assert_eq!(env.remove_named("robot"), 0);
    }

    #[test]
    fn test_push_respects_limit() {
        let mut env = EnvironmentState::new();
        env.push(PlacedObject::new("tree", Transform::default()), 2).unwrap();
        env.push(PlacedObject::new("tree", Transform::at([1.0, 0.0, 0.0])), 2).unwrap();

        let err = env.push(PlacedObject::new("tree", Transform::default()), 2).unwrap_err();
        assert!(matches!(err, AssetError::EnvironmentFull { limit: 2 }));
        assert_eq!(env.count_named("tree"), 2);
    }
}
