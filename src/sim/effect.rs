//! Timed particle effects
//!
//! Muzzle flashes and explosions share one state machine: a countdown that
//! drives particle motion, scale and opacity, and disposes the effect the
//! first frame it runs out.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{Behavior, EntityCore};
use super::scene::FrameContext;
use crate::assets::AssetResolver;
use crate::consts::{FIRE_DRIFT_FACTOR, SMOKE_RISE_RATE};
use crate::error::LoadError;
use crate::renderer::{Geometry, Material, RenderPart, colors};
use crate::{random_heading, random_int_in_range, random_sign, random_sin};

/// Which effect this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Muzzle flash and smoke puff when a tank fires
    Shoot,
    /// Enemy destruction
    Explosion,
}

/// Duration and particle budget for an effect kind
#[derive(Debug, Clone, Copy)]
pub struct EffectProfile {
    /// Seconds the effect lives
    pub duration: f32,
    pub min_particles: u32,
    pub max_particles: u32,
    /// Max angular deviation of fire particles from the base heading
    pub spread: f32,
    /// Fire particle speeds are uniform in [0, max_speed)
    pub max_speed: f32,
    pub particle_radius: f32,
    pub fire_color: u32,
}

impl EffectKind {
    pub fn profile(self) -> EffectProfile {
        use std::f32::consts::PI;
        match self {
            EffectKind::Shoot => EffectProfile {
                duration: 1.0,
                min_particles: 4,
                max_particles: 9,
                spread: PI * 0.08,
                max_speed: 1.75 * 3.0,
                particle_radius: 0.1,
                fire_color: colors::FIRE,
            },
            EffectKind::Explosion => EffectProfile {
                duration: 1.5,
                min_particles: 12,
                max_particles: 20,
                spread: PI,
                max_speed: 1.75 * 3.0,
                particle_radius: 0.1,
                fire_color: colors::EXPLOSION_FIRE,
            },
        }
    }
}

/// Fire particle motion, fixed at spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spark {
    pub angle: f32,
    pub speed: f32,
}

/// A self-disposing particle effect
#[derive(Debug)]
pub struct Effect {
    kind: EffectKind,
    /// Base direction for fire particles (shoot effects)
    heading: f32,
    /// Scales particle size and speed
    size: f32,
    remaining: f32,
    sparks: Vec<Spark>,
}

impl Effect {
    fn new(kind: EffectKind, heading: f32, size: f32) -> Self {
        Self {
            kind,
            heading,
            size,
            remaining: kind.profile().duration,
            sparks: Vec::new(),
        }
    }

    /// Muzzle flash aimed along `heading`
    pub fn shoot(heading: f32) -> Self {
        Self::new(EffectKind::Shoot, heading, 1.0)
    }

    /// Explosion scaled by `size`
    pub fn explosion(size: f32) -> Self {
        Self::new(EffectKind::Explosion, 0.0, size)
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn remaining_duration(&self) -> f32 {
        self.remaining
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }
}

impl Behavior for Effect {
    async fn load(
        &mut self,
        core: &mut EntityCore,
        _assets: &dyn AssetResolver,
        rng: &mut Pcg32,
    ) -> Result<(), LoadError> {
        let profile = self.kind.profile();
        let radius = profile.particle_radius * self.size;
        let count = random_int_in_range(rng, profile.min_particles, profile.max_particles);
        let base = match self.kind {
            EffectKind::Shoot => self.heading,
            EffectKind::Explosion => random_heading(rng),
        };

        for _ in 0..count {
            let offset = profile.spread * rng.random::<f32>() * random_sin(rng);
            let speed = profile.max_speed * self.size * rng.random::<f32>();
            self.sparks.push(Spark {
                angle: base + offset,
                speed,
            });
            core.renderable.add(RenderPart::new(
                "fire",
                Geometry::Dodecahedron { radius },
                Material::solid(profile.fire_color),
            ));
        }

        for _ in 0..count {
            let jitter = Vec3::new(
                rng.random::<f32>() * radius * random_sign(rng),
                rng.random::<f32>() * radius * random_sign(rng),
                rng.random::<f32>() * radius * random_sign(rng),
            );
            core.renderable.add(
                RenderPart::new(
                    "smoke",
                    Geometry::Dodecahedron { radius },
                    Material::translucent(colors::SMOKE),
                )
                .with_offset(jitter),
            );
        }
        Ok(())
    }

    fn update(&mut self, core: &mut EntityCore, dt: f32, _ctx: &mut FrameContext<'_>) {
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            core.mark_for_disposal();
            return;
        }

        let remaining = self.remaining;
        let split = self.sparks.len().min(core.renderable.parts.len());
        let (fire, smoke) = core.renderable.parts.split_at_mut(split);

        // Fire decelerates and shrinks as the effect ages
        for (part, spark) in fire.iter_mut().zip(&self.sparks) {
            let drift = Vec3::new(
                spark.speed * spark.angle.sin(),
                -spark.speed * spark.angle.cos(),
                0.0,
            );
            part.offset += drift * dt * remaining * FIRE_DRIFT_FACTOR;
            part.scale = remaining;
        }

        for part in smoke {
            part.material.opacity = remaining;
            part.offset.z += SMOKE_RISE_RATE * dt;
        }
    }

    fn dispose(&mut self, core: &mut EntityCore) {
        log::trace!(
            "{:?} effect {} releasing {} particles",
            self.kind,
            core.id(),
            core.renderable.parts.len()
        );
        self.sparks.clear();
    }
}
