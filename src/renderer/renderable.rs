//! Renderable handles owned by entities

use glam::Vec3;

use super::colors;
use crate::assets::TextureHandle;
use crate::sim::collision::Aabb;

/// Geometry kinds the backend knows how to draw
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Flat quad on the ground plane
    Plane { width: f32, height: f32 },
    /// Axis-aligned box
    Cuboid { size: Vec3 },
    /// Low-poly particle
    Dodecahedron { radius: f32 },
    Sphere { radius: f32 },
    /// Mesh taken from a loaded model
    Mesh { bounds: Aabb },
}

impl Geometry {
    /// Local-space bounds at unit scale
    pub fn local_bounds(&self) -> Aabb {
        match self {
            Geometry::Plane { width, height } => {
                let half = Vec3::new(width / 2.0, height / 2.0, 0.0);
                Aabb::new(-half, half)
            }
            Geometry::Cuboid { size } => Aabb::new(-*size / 2.0, *size / 2.0),
            Geometry::Dodecahedron { radius } | Geometry::Sphere { radius } => {
                Aabb::new(Vec3::splat(-radius), Vec3::splat(*radius))
            }
            Geometry::Mesh { bounds } => *bounds,
        }
    }
}

/// Surface material
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// RGB color (0xRRGGBB)
    pub color: u32,
    pub texture: Option<TextureHandle>,
    /// 0.0 (invisible) - 1.0 (opaque); only honored when `transparent`
    pub opacity: f32,
    pub transparent: bool,
}

impl Material {
    pub fn solid(color: u32) -> Self {
        Self {
            color,
            texture: None,
            opacity: 1.0,
            transparent: false,
        }
    }

    pub fn translucent(color: u32) -> Self {
        Self {
            transparent: true,
            ..Self::solid(color)
        }
    }

    pub fn textured(texture: TextureHandle) -> Self {
        Self {
            texture: Some(texture),
            ..Self::solid(colors::WHITE)
        }
    }
}

/// One drawable piece of a renderable
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPart {
    pub name: String,
    /// Offset from the renderable's origin
    pub offset: Vec3,
    pub scale: f32,
    pub geometry: Geometry,
    pub material: Material,
}

impl RenderPart {
    pub fn new(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self {
            name: name.into(),
            offset: Vec3::ZERO,
            scale: 1.0,
            geometry,
            material,
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Bounds relative to the renderable's origin
    pub fn bounds(&self) -> Aabb {
        let local = self.geometry.local_bounds();
        Aabb::new(local.min * self.scale + self.offset, local.max * self.scale + self.offset)
    }
}

/// Visual representation of one entity. Owned exclusively by that entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Renderable {
    pub position: Vec3,
    /// Rotation about +Z (radians)
    pub rotation: f32,
    pub parts: Vec<RenderPart>,
}

impl Renderable {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn add(&mut self, part: RenderPart) {
        self.parts.push(part);
    }

    /// World-space bounds of every part (rotation ignored), if any
    pub fn world_bounds(&self) -> Option<Aabb> {
        self.parts
            .iter()
            .map(RenderPart::bounds)
            .reduce(|a, b| a.union(&b))
            .map(|b| b.translated(self.position))
    }

    /// Drop every part's geometry and material. Returns how many were freed.
    pub fn release(&mut self) -> usize {
        let released = self.parts.len();
        self.parts.clear();
        self.parts.shrink_to_fit();
        released
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
