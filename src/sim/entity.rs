//! Entity base and lifecycle
//!
//! An entity is a [`EntityCore`] (what the scene and the collision system
//! need to see) plus a [`Body`] naming which kind of thing it is. Bodies
//! implement [`Behavior`] for load/update/dispose.
//!
//! Lifecycle: `Unloaded -> Loaded -> Active -> Disposing -> Removed`.

use std::fmt;

use glam::Vec3;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Shape, Sphere};
use super::effect::Effect;
use super::enemy::EnemyTank;
use super::map::{MapTile, Wall};
use super::player::PlayerTank;
use super::projectile::Projectile;
use super::scene::{FrameContext, Spawner};
use crate::assets::AssetResolver;
use crate::error::LoadError;
use crate::renderer::Renderable;

/// Scene-unique entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Coarse type tag used to filter collision queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    General,
    Player,
    Enemy,
    Bullet,
}

/// Where an entity is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, renderable not built yet
    Unloaded,
    /// Assets resolved, waiting to join the scene
    Loaded,
    /// In the scene, updated every frame
    Active,
    /// Flagged for removal at the next prune
    Disposing,
    /// Detached and released
    Removed,
}

/// State shared by every entity kind
#[derive(Debug)]
pub struct EntityCore {
    id: EntityId,
    entity_type: EntityType,
    pub(crate) position: Vec3,
    pub(crate) renderable: Renderable,
    collider: Option<Sphere>,
    should_dispose: bool,
}

impl EntityCore {
    fn new(id: EntityId, entity_type: EntityType, position: Vec3) -> Self {
        Self {
            id,
            entity_type,
            position,
            renderable: Renderable::at(position),
            collider: None,
            should_dispose: false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn collider(&self) -> Option<Sphere> {
        self.collider
    }

    pub fn should_dispose(&self) -> bool {
        self.should_dispose
    }

    /// Once set, never cleared
    pub(crate) fn mark_for_disposal(&mut self) {
        self.should_dispose = true;
    }

    pub(crate) fn set_collider(&mut self, shape: Shape) {
        self.collider = Some(shape.into_sphere());
    }

    /// Apply an accepted displacement to everything that tracks position
    pub(crate) fn commit_move(&mut self, displacement: Vec3) {
        self.position += displacement;
        self.renderable.position = self.position;
        if let Some(collider) = self.collider.as_mut() {
            collider.center += displacement;
        }
    }
}

/// Capability interface implemented by every body kind
pub(crate) trait Behavior {
    /// Build the renderable (and collider, if any) from resolved assets
    async fn load(
        &mut self,
        core: &mut EntityCore,
        assets: &dyn AssetResolver,
        rng: &mut Pcg32,
    ) -> Result<(), LoadError>;

    /// Advance one frame
    fn update(&mut self, _core: &mut EntityCore, _dt: f32, _ctx: &mut FrameContext<'_>) {}

    /// Forget body-owned resources; the renderable is released by the caller
    fn dispose(&mut self, _core: &mut EntityCore) {}
}

/// The closed set of entity kinds
#[derive(Debug)]
pub enum Body {
    MapTile(MapTile),
    Wall(Wall),
    Player(PlayerTank),
    Enemy(EnemyTank),
    Projectile(Projectile),
    Effect(Effect),
}

impl Body {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Body::Player(_) => EntityType::Player,
            Body::Enemy(_) => EntityType::Enemy,
            Body::Projectile(_) => EntityType::Bullet,
            Body::MapTile(_) | Body::Wall(_) | Body::Effect(_) => EntityType::General,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Body::MapTile(_) => "tile",
            Body::Wall(_) => "wall",
            Body::Player(_) => "player",
            Body::Enemy(_) => "enemy",
            Body::Projectile(_) => "projectile",
            Body::Effect(_) => "effect",
        }
    }

    async fn load(
        &mut self,
        core: &mut EntityCore,
        assets: &dyn AssetResolver,
        rng: &mut Pcg32,
    ) -> Result<(), LoadError> {
        match self {
            Body::MapTile(b) => b.load(core, assets, rng).await,
            Body::Wall(b) => b.load(core, assets, rng).await,
            Body::Player(b) => b.load(core, assets, rng).await,
            Body::Enemy(b) => b.load(core, assets, rng).await,
            Body::Projectile(b) => b.load(core, assets, rng).await,
            Body::Effect(b) => b.load(core, assets, rng).await,
        }
    }

    fn update(&mut self, core: &mut EntityCore, dt: f32, ctx: &mut FrameContext<'_>) {
        match self {
            Body::MapTile(b) => b.update(core, dt, ctx),
            Body::Wall(b) => b.update(core, dt, ctx),
            Body::Player(b) => b.update(core, dt, ctx),
            Body::Enemy(b) => b.update(core, dt, ctx),
            Body::Projectile(b) => b.update(core, dt, ctx),
            Body::Effect(b) => b.update(core, dt, ctx),
        }
    }

    fn dispose(&mut self, core: &mut EntityCore) {
        match self {
            Body::MapTile(b) => b.dispose(core),
            Body::Wall(b) => b.dispose(core),
            Body::Player(b) => b.dispose(core),
            Body::Enemy(b) => b.dispose(core),
            Body::Projectile(b) => b.dispose(core),
            Body::Effect(b) => b.dispose(core),
        }
    }
}

/// A simulated object
#[derive(Debug)]
pub struct Entity {
    core: EntityCore,
    body: Body,
    lifecycle: Lifecycle,
}

impl Entity {
    pub fn new(id: EntityId, position: Vec3, body: Body) -> Self {
        Self {
            core: EntityCore::new(id, body.entity_type(), position),
            body,
            lifecycle: Lifecycle::Unloaded,
        }
    }

    pub fn id(&self) -> EntityId {
        self.core.id
    }

    pub fn entity_type(&self) -> EntityType {
        self.core.entity_type
    }

    pub fn kind_name(&self) -> &'static str {
        self.body.name()
    }

    pub fn position(&self) -> Vec3 {
        self.core.position
    }

    pub fn collider(&self) -> Option<Sphere> {
        self.core.collider
    }

    pub fn renderable(&self) -> &Renderable {
        &self.core.renderable
    }

    pub fn should_dispose(&self) -> bool {
        self.core.should_dispose
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn state(&self) -> Lifecycle {
        match self.lifecycle {
            Lifecycle::Removed => Lifecycle::Removed,
            _ if self.core.should_dispose => Lifecycle::Disposing,
            state => state,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == Lifecycle::Active
    }

    pub fn as_player(&self) -> Option<&PlayerTank> {
        match &self.body {
            Body::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_enemy(&self) -> Option<&EnemyTank> {
        match &self.body {
            Body::Enemy(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_projectile(&self) -> Option<&Projectile> {
        match &self.body {
            Body::Projectile(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_effect(&self) -> Option<&Effect> {
        match &self.body {
            Body::Effect(e) => Some(e),
            _ => None,
        }
    }

    pub(crate) fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    /// Resolve assets and build the renderable. Must finish before the
    /// entity is added to a scene.
    pub async fn load(&mut self, assets: &dyn AssetResolver, rng: &mut Pcg32) -> Result<(), LoadError> {
        if self.lifecycle != Lifecycle::Unloaded {
            log::warn!("{} {} loaded twice", self.kind_name(), self.id());
            return Ok(());
        }
        self.body.load(&mut self.core, assets, rng).await?;
        self.core.renderable.position = self.core.position;
        self.lifecycle = Lifecycle::Loaded;
        Ok(())
    }

    pub(crate) fn activate(&mut self) {
        if self.lifecycle == Lifecycle::Loaded {
            self.lifecycle = Lifecycle::Active;
        }
    }

    /// Advance one frame. Does nothing unless the entity is active.
    pub fn update(&mut self, dt: f32, ctx: &mut FrameContext<'_>) {
        if !self.is_active() {
            return;
        }
        self.body.update(&mut self.core, dt, ctx);
    }

    /// Release the renderable and body resources. Returns the number of
    /// render parts freed; a second call frees nothing.
    pub fn dispose(&mut self) -> usize {
        if self.lifecycle == Lifecycle::Removed {
            log::warn!("{} {} disposed twice", self.kind_name(), self.id());
            return 0;
        }
        self.body.dispose(&mut self.core);
        let released = self.core.renderable.release();
        self.core.collider = None;
        self.lifecycle = Lifecycle::Removed;
        released
    }

    /// Apply damage. Only enemies take damage; returns true when this call
    /// destroyed the entity.
    pub(crate) fn damage(&mut self, amount: i32, spawner: &mut Spawner) -> bool {
        if !self.is_active() {
            return false;
        }
        match &mut self.body {
            Body::Enemy(enemy) => enemy.damage(&mut self.core, amount, spawner),
            _ => false,
        }
    }
}

#[cfg(test)]
impl Entity {
    /// Active entity with an optional sphere collider, skipping asset loading
    pub(crate) fn active_stub(id: u32, position: Vec3, body: Body, radius: Option<f32>) -> Self {
        let mut entity = Self::new(EntityId(id), position, body);
        if let Some(radius) = radius {
            entity.core.set_collider(Shape::Sphere(Sphere::new(position, radius)));
        }
        entity.lifecycle = Lifecycle::Active;
        entity
    }

    pub(crate) fn without_collider(mut self) -> Self {
        self.core.collider = None;
        self
    }

    pub(crate) fn mark_for_disposal(&mut self) {
        self.core.mark_for_disposal();
    }
}
