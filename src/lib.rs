//! Tank Arena - a top-down tank combat simulation core
//!
//! Core modules:
//! - `sim`: Entity lifecycle, collision gating, controllers and the frame orchestrator
//! - `renderer`: Render-side handles and the backend interface the scene hands frames to
//! - `assets`: Resource manager and asset loader interface
//! - `settings`: Data-driven game tuning
//! - `error`: Load and scene error types

pub mod assets;
pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{LoadError, SceneError};
pub use settings::Settings;

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    use std::f32::consts::PI;

    /// Player turn rate (radians per second)
    pub const PLAYER_TURN_RATE: f32 = PI;
    /// Distance ahead of the tank where projectiles and muzzle flashes spawn
    pub const MUZZLE_OFFSET: f32 = 0.3;
    /// Vehicle colliders are shrunk to reduce blocking from visual overhang
    pub const VEHICLE_COLLIDER_SHRINK: f32 = 0.75;

    /// Fire particles slow down as the effect ages (see `Effect::update`)
    pub const FIRE_DRIFT_FACTOR: f32 = 0.75;
    /// Smoke rises at a constant rate (units per second)
    pub const SMOKE_RISE_RATE: f32 = 3.0;

    /// Projectile collider radius
    pub const PROJECTILE_RADIUS: f32 = 0.05;

    /// Camera defaults
    pub const CAMERA_HEIGHT: f32 = 3.0;
    pub const CAMERA_FOV_DEG: f32 = 45.0;
    pub const CAMERA_NEAR: f32 = 0.1;
    pub const CAMERA_FAR: f32 = 1000.0;
}

/// Keep a rotation inside [0, 2π).
///
/// Overflow past a full turn is reflected (`2π - value`) rather than taken
/// modulo; whatever is left negative is shifted up by whole turns.
#[inline]
pub fn wrap_rotation(rotation: f32) -> f32 {
    let mut rotation = rotation;
    if rotation >= TAU {
        rotation = TAU - rotation;
    }
    let wrapped = rotation.rem_euclid(TAU);
    // rem_euclid can round a tiny negative up to exactly TAU
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Unit forward vector for a heading on the ground plane.
///
/// Rotation 0 faces -Y; positive rotation turns toward +X.
#[inline]
pub fn heading(rotation: f32) -> Vec3 {
    Vec3::new(rotation.sin(), -rotation.cos(), 0.0)
}

/// Uniform random heading in [0, 2π)
#[inline]
pub fn random_heading(rng: &mut impl Rng) -> f32 {
    rng.random_range(0.0..TAU)
}

/// 50/50 sign modifier
#[inline]
pub fn random_sign(rng: &mut impl Rng) -> f32 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

/// Random integer in [min, max]
#[inline]
pub fn random_int_in_range(rng: &mut impl Rng, min: u32, max: u32) -> u32 {
    rng.random_range(min..=max)
}

/// Sine-weighted value in [-1, 1], biased toward the extremes
#[inline]
pub fn random_sin(rng: &mut impl Rng) -> f32 {
    (rng.random::<f32>() * TAU).sin()
}
