//! Enemy tank AI
//!
//! Enemies drive straight ahead until something blocks them, then pick a
//! fresh random heading and try again next frame.

use rand_pcg::Pcg32;

use super::collision::{MoveOutcome, VEHICLE_EXCLUDES, try_move};
use super::effect::Effect;
use super::entity::{Behavior, Body, EntityCore};
use super::scene::{FrameContext, Spawner};
use super::vehicle::{ENEMY_SKIN, assemble_tank};
use crate::assets::AssetResolver;
use crate::error::LoadError;
use crate::settings::Settings;
use crate::{heading, random_heading};

const DEFAULT_EXPLOSION_SIZE: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct EnemyTank {
    rotation: f32,
    move_speed: f32,
    life: i32,
    explosion_size: f32,
}

impl EnemyTank {
    pub fn new(rotation: f32, move_speed: f32, life: i32) -> Self {
        Self {
            rotation,
            move_speed,
            life,
            explosion_size: DEFAULT_EXPLOSION_SIZE,
        }
    }

    pub fn from_settings(rotation: f32, settings: &Settings) -> Self {
        Self {
            explosion_size: settings.explosion_size,
            ..Self::new(rotation, settings.enemy_move_speed, settings.enemy_life)
        }
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn life(&self) -> i32 {
        self.life
    }

    pub fn is_destroyed(&self) -> bool {
        self.life <= 0
    }

    /// Subtract `amount` from life. The call that takes life to zero or
    /// below flags the tank and stages its explosion; returns true only then.
    pub(crate) fn damage(&mut self, core: &mut EntityCore, amount: i32, spawner: &mut Spawner) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.life = self.life.saturating_sub(amount);
        log::debug!("Enemy {} took {} damage, life {}", core.id(), amount, self.life);
        if !self.is_destroyed() {
            return false;
        }

        core.mark_for_disposal();
        let explosion = spawner.spawn(core.position(), Body::Effect(Effect::explosion(self.explosion_size)));
        log::info!("Enemy {} destroyed, explosion {} staged", core.id(), explosion);
        true
    }
}

impl Behavior for EnemyTank {
    async fn load(
        &mut self,
        core: &mut EntityCore,
        assets: &dyn AssetResolver,
        _rng: &mut Pcg32,
    ) -> Result<(), LoadError> {
        assemble_tank(core, assets, ENEMY_SKIN)?;
        core.renderable.rotation = self.rotation;
        Ok(())
    }

    fn update(&mut self, core: &mut EntityCore, dt: f32, ctx: &mut FrameContext<'_>) {
        let displacement = heading(self.rotation) * self.move_speed * dt;

        match try_move(core, displacement, ctx.others, VEHICLE_EXCLUDES) {
            MoveOutcome::Moved => core.renderable.rotation = self.rotation,
            MoveOutcome::Blocked(_) => {
                self.rotation = random_heading(ctx.rng());
                log::trace!("Enemy {} blocked, turning to {:.3}", core.id(), self.rotation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Entity, EntityId, EntityType};
    use crate::sim::map::Wall;
    use crate::sim::testing;
    use glam::Vec3;

    fn enemy_at(position: Vec3, rotation: f32) -> Entity {
        testing::loaded_entity(EntityId(1), position, Body::Enemy(EnemyTank::new(rotation, 1.0, 100)), 5)
    }

    fn rotation(entity: &Entity) -> f32 {
        entity.as_enemy().unwrap().rotation()
    }

    #[test]
    fn test_drives_along_fixed_heading() {
        let mut enemy = enemy_at(Vec3::new(5.0, 5.0, 0.0), 0.0);
        let mut harness = testing::Harness::new();

        harness.update(&mut enemy, 0.5);

        assert_eq!(enemy.position(), Vec3::new(5.0, 4.5, 0.0));
        assert_eq!(rotation(&enemy), 0.0);
    }

    #[test]
    fn test_blocked_enemy_turns_without_moving_then_resumes() {
        let mut enemy = enemy_at(Vec3::new(5.0, 5.0, 0.0), 0.0);
        let wall = Entity::active_stub(2, Vec3::new(5.0, 4.2, 0.0), Body::Wall(Wall::default()), Some(0.5));
        let mut others = vec![wall];
        let mut harness = testing::Harness::new();

        harness.update_among(&mut enemy, 0.1, &others);

        assert_eq!(enemy.position(), Vec3::new(5.0, 5.0, 0.0));
        let redirected = rotation(&enemy);
        assert_ne!(redirected, 0.0);
        assert!((0.0..std::f32::consts::TAU).contains(&redirected));

        // obstacle gone: the new heading is followed
        others.clear();
        harness.update_among(&mut enemy, 0.1, &others);
        let expected = Vec3::new(5.0, 5.0, 0.0) + heading(redirected) * 0.1;
        assert!((enemy.position() - expected).length() < 1e-6);
        assert_eq!(enemy.renderable().rotation, redirected);
    }

    #[test]
    fn test_same_seed_same_redirect() {
        let run = || {
            let mut enemy = enemy_at(Vec3::ZERO, 0.0);
            let wall = Entity::active_stub(2, Vec3::new(0.0, -0.5, 0.0), Body::Wall(Wall::default()), Some(0.5));
            let mut harness = testing::Harness::new();
            harness.update_among(&mut enemy, 0.1, &[wall]);
            rotation(&enemy)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_lethal_damage_flags_and_explodes_once() {
        let mut enemy = enemy_at(Vec3::new(2.0, 3.0, 0.0), 0.0);
        let mut harness = testing::Harness::new();

        assert!(enemy.damage(100, &mut harness.spawner));
        assert!(enemy.should_dispose());
        assert!(!enemy.damage(100, &mut harness.spawner));

        let staged = harness.spawner.staged();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].entity_type, EntityType::General);
        assert_eq!(staged[0].position, Vec3::new(2.0, 3.0, 0.0));
    }

    #[test]
    fn test_partial_damage_keeps_enemy_alive() {
        let mut enemy = enemy_at(Vec3::ZERO, 0.0);
        let mut harness = testing::Harness::new();

        assert!(!enemy.damage(25, &mut harness.spawner));
        assert_eq!(enemy.as_enemy().unwrap().life(), 75);
        assert!(!enemy.should_dispose());
        assert!(harness.spawner.staged().is_empty());
    }

    #[test]
    fn test_extreme_damage_saturates() {
        let mut enemy = enemy_at(Vec3::ZERO, 0.0);
        let mut harness = testing::Harness::new();

        assert!(!enemy.damage(i32::MIN, &mut harness.spawner));
        assert_eq!(enemy.as_enemy().unwrap().life(), i32::MAX);
        assert!(!enemy.should_dispose());

        assert!(enemy.damage(i32::MAX, &mut harness.spawner));
        assert_eq!(enemy.as_enemy().unwrap().life(), 0);
        assert_eq!(harness.spawner.staged().len(), 1);
    }

    #[test]
    fn test_flagged_enemy_no_longer_updates() {
        let mut enemy = enemy_at(Vec3::new(5.0, 5.0, 0.0), 0.0);
        let wall = Entity::active_stub(2, Vec3::new(5.0, 4.2, 0.0), Body::Wall(Wall::default()), Some(0.5));
        let collider = enemy.collider();
        let mut harness = testing::Harness::new();

        enemy.mark_for_disposal();
        harness.update(&mut enemy, 0.5);
        harness.update_among(&mut enemy, 0.1, &[wall]);

        assert_eq!(enemy.position(), Vec3::new(5.0, 5.0, 0.0));
        assert_eq!(rotation(&enemy), 0.0);
        assert_eq!(enemy.renderable().rotation, 0.0);
        assert_eq!(enemy.collider(), collider);
        assert!(harness.spawner.staged().is_empty());
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            enemy_life: 50,
            enemy_move_speed: 1.5,
            ..Settings::default()
        };
        let enemy = EnemyTank::from_settings(1.0, &settings);
        assert_eq!(enemy.life(), 50);
        assert_eq!(enemy.move_speed, 1.5);
        assert_eq!(enemy.explosion_size, settings.explosion_size);
    }
}
