//! Scene collaborator
//!
//! The renderer is outside this crate. Core operations call these hooks after
//! their state is durable; a hook failure is logged and never undoes the
//! operation that triggered it.

use thiserror::Error;

use crate::asset::EnvironmentAsset;

/// A collaborator refused or failed a request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scene: {0}")]
pub struct SceneError(pub String);

/// Hooks into the live 3-D scene
pub trait SceneHooks {
    /// Terrain changed, rebuild the affected meshes
    fn rebuild_terrain_visuals(&mut self) -> Result<(), SceneError>;

    /// Reload placed objects and models from durable state
    fn refresh_environment_from_db(&mut self) -> Result<(), SceneError>;

    /// Make a newly imported model placeable
    fn add_custom_model(&mut self, model: &EnvironmentAsset) -> Result<(), SceneError>;
}

/// Scene that accepts every request and does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScene;

impl SceneHooks for NullScene {
    fn rebuild_terrain_visuals(&mut self) -> Result<(), SceneError> {
        Ok(())
    }

    fn refresh_environment_from_db(&mut self) -> Result<(), SceneError> {
        Ok(())
    }

    fn add_custom_model(&mut self, _model: &EnvironmentAsset) -> Result<(), SceneError> {
        Ok(())
    }
}

/// Log a hook failure; returns the message for reports
pub(crate) fn report(hook: &str, result: Result<(), SceneError>) -> Option<String> {
    match result {
        Ok(()) => None,
        Err(e) => {
            log::warn!("{} failed: {}", hook, e);
            Some(format!("{} failed: {}", hook, e))
        }
    }
}
