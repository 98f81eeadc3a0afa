//! Player tank controller
//!
//! Reads the scene's [`InputState`](super::input::InputState) each frame:
//! left/right turn at a fixed rate, up/down drive along the current heading,
//! fire spawns a projectile plus a muzzle flash just ahead of the tank.

use rand_pcg::Pcg32;

use super::collision::{MoveOutcome, VEHICLE_EXCLUDES, try_move};
use super::effect::Effect;
use super::entity::{Behavior, Body, EntityCore};
use super::projectile::Projectile;
use super::scene::FrameContext;
use super::vehicle::{PLAYER_SKIN, assemble_tank};
use crate::assets::AssetResolver;
use crate::consts::{MUZZLE_OFFSET, PLAYER_TURN_RATE};
use crate::error::LoadError;
use crate::{heading, wrap_rotation};

/// The player's tank
#[derive(Debug, Clone)]
pub struct PlayerTank {
    /// Heading in radians, kept in [0, 2π)
    rotation: f32,
    /// Tiles per second
    move_speed: f32,
}

impl PlayerTank {
    pub fn new(move_speed: f32) -> Self {
        Self {
            rotation: 0.0,
            move_speed,
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = wrap_rotation(rotation);
        self
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    fn fire(&self, core: &EntityCore, ctx: &mut FrameContext<'_>) {
        let muzzle = core.position() + heading(self.rotation) * MUZZLE_OFFSET;
        let projectile = Projectile::from_settings(self.rotation, ctx.settings);
        let id = ctx.spawner.spawn(muzzle, Body::Projectile(projectile));
        ctx.spawner.spawn(muzzle, Body::Effect(Effect::shoot(self.rotation)));
        log::debug!("Player fired projectile {} at {:?}", id, muzzle);
    }
}

impl Behavior for PlayerTank {
    async fn load(
        &mut self,
        core: &mut EntityCore,
        assets: &dyn AssetResolver,
        _rng: &mut Pcg32,
    ) -> Result<(), LoadError> {
        assemble_tank(core, assets, PLAYER_SKIN)?;
        core.renderable.rotation = self.rotation;
        Ok(())
    }

    fn update(&mut self, core: &mut EntityCore, dt: f32, ctx: &mut FrameContext<'_>) {
        let input = *ctx.input;

        let mut rotation = self.rotation;
        if input.left {
            rotation += PLAYER_TURN_RATE * dt;
        } else if input.right {
            rotation -= PLAYER_TURN_RATE * dt;
        }
        self.rotation = wrap_rotation(rotation);
        core.renderable.rotation = self.rotation;

        if input.fire {
            self.fire(core, ctx);
        }

        let forward = heading(self.rotation) * self.move_speed * dt;
        let displacement = if input.up {
            forward
        } else if input.down {
            -forward
        } else {
            return;
        };

        match try_move(core, displacement, ctx.others, VEHICLE_EXCLUDES) {
            MoveOutcome::Moved => ctx.camera.follow(core.position()),
            MoveOutcome::Blocked(blockers) => {
                log::trace!("Player blocked by {:?}", blockers);
            }
        }
    }
}
