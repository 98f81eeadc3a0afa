//! Simulation module
//!
//! All gameplay logic lives here. Rendering is reached only through the
//! [`RenderBackend`](crate::renderer::RenderBackend) the scene is built with:
//! - Seeded RNG only; every spawn gets its own forked generator
//! - Stable iteration order (collection order, ids allocated monotonically)
//! - Entities only enter or leave the scene at the start of a frame

pub mod clock;
pub mod collision;
pub mod effect;
pub mod enemy;
pub mod entity;
pub mod input;
pub mod map;
pub mod player;
pub mod projectile;
pub mod scene;
pub mod vehicle;

pub use clock::{FixedClock, FrameClock, SystemClock};
pub use collision::{Aabb, Blocker, MoveOutcome, Others, Shape, Sphere, try_move};
pub use effect::{Effect, EffectKind};
pub use enemy::EnemyTank;
pub use entity::{Body, Entity, EntityCore, EntityId, EntityType, Lifecycle};
pub use input::{InputEvent, InputState, Key};
pub use map::{ArenaLayout, MapTile, Wall};
pub use player::PlayerTank;
pub use projectile::Projectile;
pub use scene::{FrameContext, Hit, Scene, Spawner, StagedSpawn};
