//! Asset resolution
//!
//! Decoding textures and models is the job of an external [`AssetLoader`].
//! The [`ResourceManager`] drives it once at bootstrap, then answers lookups
//! through [`AssetResolver`] for the rest of the run.

use std::cell::Cell;
use std::collections::HashMap;

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::error::LoadError;
use crate::sim::collision::Aabb;

/// Ground textures, picked at random per map tile
pub const GROUND_TEXTURE_FILES: [&str; 8] = [
    "textures/g1.png",
    "textures/g2.png",
    "textures/g3.png",
    "textures/g4.png",
    "textures/g5.png",
    "textures/g6.png",
    "textures/g7.png",
    "textures/g8.png",
];

/// Named textures: (lookup name, path)
pub const TEXTURE_FILES: [(&str, &str); 5] = [
    ("tank-body", "textures/tank-body.png"),
    ("tank-turret", "textures/tank-turret.png"),
    ("tank-body-red", "textures/tank-body-red.png"),
    ("tank-turret-red", "textures/tank-turret-red.png"),
    ("wall", "textures/wall.png"),
];

/// Named models: (lookup name, path)
pub const MODEL_FILES: [(&str, &str); 1] = [("tank", "models/tank.glb")];

/// Opaque handle to a decoded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// One named mesh inside a model
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    /// Local-space bounds of the mesh geometry
    pub bounds: Aabb,
}

/// A decoded model. Cloning yields an independent instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHandle {
    pub name: String,
    pub parts: Vec<MeshData>,
}

impl ModelHandle {
    /// Find a mesh part by name
    pub fn part(&self, name: &str) -> Option<&MeshData> {
        self.parts.iter().find(|p| p.name == name)
    }
}

/// External decoder for asset files
#[allow(async_fn_in_trait)]
pub trait AssetLoader {
    async fn load_texture(&self, path: &str) -> Result<TextureHandle, LoadError>;
    async fn load_model(&self, path: &str) -> Result<ModelHandle, LoadError>;
}

/// Lookup capability handed to entities while they load
pub trait AssetResolver {
    fn model(&self, name: &str) -> Option<ModelHandle>;
    fn texture(&self, name: &str) -> Option<TextureHandle>;
    fn random_ground_texture(&self, rng: &mut Pcg32) -> Option<TextureHandle>;
}

/// Holds every asset the game needs after bootstrap
#[derive(Debug, Default)]
pub struct ResourceManager {
    ground_textures: Vec<TextureHandle>,
    textures: HashMap<String, TextureHandle>,
    models: HashMap<String, ModelHandle>,
}

impl ResourceManager {
    /// Load the full asset manifest. Any failure aborts the bootstrap.
    pub async fn load(loader: &impl AssetLoader) -> Result<Self, LoadError> {
        let mut resources = Self::default();

        for path in GROUND_TEXTURE_FILES {
            let texture = loader.load_texture(path).await?;
            resources.ground_textures.push(texture);
        }

        for (name, path) in TEXTURE_FILES {
            let texture = loader.load_texture(path).await?;
            resources.insert_texture(name, texture);
        }

        for (name, path) in MODEL_FILES {
            let model = loader.load_model(path).await?;
            resources.insert_model(name, model);
        }

        log::info!(
            "Resources ready: {} ground textures, {} textures, {} models",
            resources.ground_textures.len(),
            resources.textures.len(),
            resources.models.len()
        );
        Ok(resources)
    }

    pub fn insert_texture(&mut self, name: &str, texture: TextureHandle) {
        self.textures.insert(name.to_string(), texture);
    }

    pub fn insert_model(&mut self, name: &str, model: ModelHandle) {
        self.models.insert(name.to_string(), model);
    }

    pub fn add_ground_texture(&mut self, texture: TextureHandle) {
        self.ground_textures.push(texture);
    }
}

impl AssetResolver for ResourceManager {
    fn model(&self, name: &str) -> Option<ModelHandle> {
        self.models.get(name).cloned()
    }

    fn texture(&self, name: &str) -> Option<TextureHandle> {
        self.textures.get(name).copied()
    }

    fn random_ground_texture(&self, rng: &mut Pcg32) -> Option<TextureHandle> {
        if self.ground_textures.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.ground_textures.len());
        Some(self.ground_textures[index])
    }
}

/// In-memory loader that fabricates handles instead of decoding files.
///
/// Used by the headless driver and tests. `models/tank.glb` resolves to a
/// two-part tank (`Body` and `Turret`); any path can be marked missing.
#[derive(Debug, Default)]
pub struct HeadlessLoader {
    next_texture: Cell<u32>,
    missing: Vec<String>,
}

impl HeadlessLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make loads of `path` fail
    pub fn with_missing(mut self, path: &str) -> Self {
        self.missing.push(path.to_string());
        self
    }

    /// The tank model the headless loader hands out
    pub fn tank_model() -> ModelHandle {
        ModelHandle {
            name: "tank".to_string(),
            parts: vec![
                MeshData {
                    name: "Body".to_string(),
                    bounds: Aabb::new(Vec3::new(-0.3, -0.4, 0.0), Vec3::new(0.3, 0.4, 0.3)),
                },
                MeshData {
                    name: "Turret".to_string(),
                    bounds: Aabb::new(Vec3::new(-0.15, -0.5, 0.3), Vec3::new(0.15, 0.2, 0.45)),
                },
            ],
        }
    }

    fn check(&self, path: &str) -> Result<(), LoadError> {
        if self.missing.iter().any(|m| m == path) {
            return Err(LoadError::Source {
                path: path.to_string(),
                reason: "file not found".to_string(),
            });
        }
        Ok(())
    }
}

impl AssetLoader for HeadlessLoader {
    async fn load_texture(&self, path: &str) -> Result<TextureHandle, LoadError> {
        self.check(path)?;
        let id = self.next_texture.get();
        self.next_texture.set(id + 1);
        log::trace!("texture {} -> #{}", path, id);
        Ok(TextureHandle(id))
    }

    async fn load_model(&self, path: &str) -> Result<ModelHandle, LoadError> {
        self.check(path)?;
        match path {
            "models/tank.glb" => Ok(Self::tank_model()),
            _ => Err(LoadError::Source {
                path: path.to_string(),
                reason: "unknown model".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use rand::SeedableRng;

    #[test]
    fn test_load_full_manifest() {
        let resources = block_on(ResourceManager::load(&HeadlessLoader::new())).unwrap();
        assert!(resources.model("tank").is_some());
        assert!(resources.texture("wall").is_some());
        assert!(resources.texture("tank-body-red").is_some());
        assert!(resources.texture("missing").is_none());

        let mut rng = Pcg32::seed_from_u64(1);
        let ground = resources.random_ground_texture(&mut rng).unwrap();
        assert!(resources.ground_textures.contains(&ground));
    }

    #[test]
    fn test_missing_file_aborts_bootstrap() {
        let loader = HeadlessLoader::new().with_missing("textures/wall.png");
        let err = block_on(ResourceManager::load(&loader)).unwrap_err();
        assert!(matches!(err, LoadError::Source { ref path, .. } if path == "textures/wall.png"));
    }

    #[test]
    fn test_ground_texture_needs_at_least_one_entry() {
        let mut resources = ResourceManager::default();
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(resources.random_ground_texture(&mut rng).is_none());

        resources.add_ground_texture(TextureHandle(7));
        assert_eq!(resources.random_ground_texture(&mut rng), Some(TextureHandle(7)));
    }

    #[test]
    fn test_model_clones_are_independent() {
        let mut resources = ResourceManager::default();
        resources.insert_model("tank", HeadlessLoader::tank_model());
        let mut a = resources.model("tank").unwrap();
        a.parts.clear();
        assert_eq!(resources.model("tank").unwrap().parts.len(), 2);
    }
}
