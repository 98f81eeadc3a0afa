//! Tank shells

use rand_pcg::Pcg32;

use super::collision::{MoveOutcome, PROJECTILE_EXCLUDES, Shape, Sphere, try_move};
use super::entity::{Behavior, EntityCore, EntityType};
use super::scene::FrameContext;
use crate::assets::AssetResolver;
use crate::consts::PROJECTILE_RADIUS;
use crate::error::LoadError;
use crate::heading;
use crate::renderer::{Geometry, Material, RenderPart, colors};
use crate::settings::Settings;

/// A shell flying in a straight line until it hits something or expires
#[derive(Debug, Clone)]
pub struct Projectile {
    heading: f32,
    speed: f32,
    remaining_life: f32,
    damage: i32,
}

impl Projectile {
    pub fn new(heading: f32, speed: f32, lifetime: f32, damage: i32) -> Self {
        Self {
            heading,
            speed,
            remaining_life: lifetime,
            damage,
        }
    }

    pub fn from_settings(heading: f32, settings: &Settings) -> Self {
        Self::new(
            heading,
            settings.projectile_speed,
            settings.projectile_lifetime,
            settings.projectile_damage,
        )
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn remaining_life(&self) -> f32 {
        self.remaining_life
    }

    pub fn damage(&self) -> i32 {
        self.damage
    }
}

impl Behavior for Projectile {
    async fn load(
        &mut self,
        core: &mut EntityCore,
        _assets: &dyn AssetResolver,
        _rng: &mut Pcg32,
    ) -> Result<(), LoadError> {
        core.renderable.add(RenderPart::new(
            "shell",
            Geometry::Sphere {
                radius: PROJECTILE_RADIUS,
            },
            Material::solid(colors::PROJECTILE),
        ));
        core.set_collider(Shape::Sphere(Sphere::new(core.position(), PROJECTILE_RADIUS)));
        Ok(())
    }

    fn update(&mut self, core: &mut EntityCore, dt: f32, ctx: &mut FrameContext<'_>) {
        self.remaining_life -= dt;
        if self.remaining_life <= 0.0 {
            core.mark_for_disposal();
            return;
        }

        let displacement = heading(self.heading) * self.speed * dt;
        if let MoveOutcome::Blocked(blockers) = try_move(core, displacement, ctx.others, PROJECTILE_EXCLUDES) {
            if let Some(target) = blockers.iter().find(|b| b.entity_type == EntityType::Enemy) {
                ctx.report_hit(target.id, self.damage);
            }
            core.mark_for_disposal();
        }
    }
}
