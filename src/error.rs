//! Error types
//!
//! Load failures are fatal for the entity (or the whole bootstrap) that hit
//! them. Blocked movement and expired effects are ordinary control flow and
//! never show up here.

use thiserror::Error;

use crate::sim::EntityId;

/// A required asset could not be resolved
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("model not found: {0}")]
    MissingModel(String),

    #[error("texture not found: {0}")]
    MissingTexture(String),

    #[error("model {model} has no mesh part named {part}")]
    MissingMeshPart { model: String, part: String },

    #[error("no ground textures loaded")]
    NoGroundTextures,

    #[error("failed to load {path}: {reason}")]
    Source { path: String, reason: String },
}

/// Scene registration errors
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("entity {0} must be loaded before it joins the scene")]
    NotLoaded(EntityId),

    #[error(transparent)]
    Load(#[from] LoadError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_asset() {
        let err = LoadError::MissingMeshPart {
            model: "tank".into(),
            part: "Turret".into(),
        };
        assert_eq!(err.to_string(), "model tank has no mesh part named Turret");

        let err: SceneError = LoadError::MissingTexture("wall".into()).into();
        assert_eq!(err.to_string(), "texture not found: wall");
    }
}
