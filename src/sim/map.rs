//! Arena geometry: ground tiles, border walls and spawn placement

use glam::Vec3;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::collision::{Aabb, Shape};
use super::entity::{Behavior, EntityCore};
use crate::assets::AssetResolver;
use crate::error::LoadError;
use crate::renderer::{Geometry, Material, RenderPart};

const WALL_TEXTURE: &str = "wall";
/// Enemies never spawn closer than this to the player (in tiles)
const SPAWN_CLEARANCE: f32 = 2.0;

/// One ground square with a randomly chosen texture
#[derive(Debug, Clone, Copy, Default)]
pub struct MapTile;

impl Behavior for MapTile {
    async fn load(
        &mut self,
        core: &mut EntityCore,
        assets: &dyn AssetResolver,
        rng: &mut Pcg32,
    ) -> Result<(), LoadError> {
        let texture = assets.random_ground_texture(rng).ok_or(LoadError::NoGroundTextures)?;
        core.renderable.add(RenderPart::new(
            "ground",
            Geometry::Plane {
                width: 1.0,
                height: 1.0,
            },
            Material::textured(texture),
        ));
        Ok(())
    }
}

/// Impassable block
#[derive(Debug, Clone, Copy)]
pub struct Wall {
    pub size: Vec3,
}

impl Default for Wall {
    fn default() -> Self {
        Self { size: Vec3::ONE }
    }
}

impl Behavior for Wall {
    async fn load(
        &mut self,
        core: &mut EntityCore,
        assets: &dyn AssetResolver,
        _rng: &mut Pcg32,
    ) -> Result<(), LoadError> {
        let texture = assets
            .texture(WALL_TEXTURE)
            .ok_or_else(|| LoadError::MissingTexture(WALL_TEXTURE.to_string()))?;
        core.renderable.add(RenderPart::new(
            "wall",
            Geometry::Cuboid { size: self.size },
            Material::textured(texture),
        ));
        core.set_collider(Shape::Box(Aabb::from_center_size(core.position(), self.size)));
        Ok(())
    }
}

/// Where everything goes in a square arena of `size` × `size` tiles
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaLayout {
    pub size: u32,
    pub tiles: Vec<Vec3>,
    pub walls: Vec<Vec3>,
    pub player_spawn: Vec3,
    pub enemy_spawns: Vec<Vec3>,
}

impl ArenaLayout {
    pub fn new(size: u32, enemy_count: u32, rng: &mut Pcg32) -> Self {
        let n = size as i32;

        let tiles = (0..n)
            .flat_map(|i| (0..n).map(move |j| cell(i, j)))
            .collect();

        // Border ring just outside the ground, corners included
        let mut walls = Vec::with_capacity(4 * (size as usize + 1));
        for i in -1..=n {
            walls.push(cell(i, -1));
            walls.push(cell(i, n));
        }
        for j in 0..n {
            walls.push(cell(-1, j));
            walls.push(cell(n, j));
        }

        let player_spawn = cell(n / 2, n / 2);

        let mut candidates: Vec<Vec3> = (1..n - 1)
            .flat_map(|i| (1..n - 1).map(move |j| cell(i, j)))
            .filter(|c| c.distance(player_spawn) > SPAWN_CLEARANCE)
            .collect();
        candidates.shuffle(rng);

        let wanted = enemy_count as usize;
        if candidates.len() < wanted {
            log::warn!(
                "Arena {}x{} only has room for {} of {} enemies",
                size,
                size,
                candidates.len(),
                wanted
            );
        }
        candidates.truncate(wanted);

        Self {
            size,
            tiles,
            walls,
            player_spawn,
            enemy_spawns: candidates,
        }
    }
}

#[inline]
fn cell(i: i32, j: i32) -> Vec3 {
    Vec3::new(i as f32, j as f32, 0.0)
}
