//! Render-side interface
//!
//! The simulation never touches the GPU. Each entity owns a [`Renderable`]
//! describing what it looks like; a [`RenderBackend`] receives attach/detach
//! notifications and one render call per frame.

pub mod backend;
pub mod camera;
pub mod renderable;

pub use backend::{HeadlessBackend, RenderBackend};
pub use camera::Camera;
pub use renderable::{Geometry, Material, RenderPart, Renderable};

/// Colors for game elements
pub mod colors {
    pub const FIRE: u32 = 0xff4500;
    pub const EXPLOSION_FIRE: u32 = 0xffa500;
    pub const SMOKE: u32 = 0xfafafa;
    pub const PROJECTILE: u32 = 0x202020;
    pub const WHITE: u32 = 0xffffff;
}
