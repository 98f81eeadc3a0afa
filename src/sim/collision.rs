//! Broad-phase collision and movement gating
//!
//! Every collider is a sphere. Movement is gated by a trial volume: the
//! mover's collider is cloned, pushed by the candidate displacement, and
//! tested against everyone else before anything is committed.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityCore, EntityId, EntityType};

/// Vehicles drive through projectiles
pub const VEHICLE_EXCLUDES: &[EntityType] = &[EntityType::Bullet];
/// Projectiles ignore each other and their owner
pub const PROJECTILE_EXCLUDES: &[EntityType] = &[EntityType::Bullet, EntityType::Player];

/// A bounding sphere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Spheres touching at a single point count as intersecting
    #[inline]
    pub fn intersects(&self, other: &Sphere) -> bool {
        let radius_sum = self.radius + other.radius;
        self.center.distance_squared(other.center) <= radius_sum * radius_sum
    }

    /// Copy of this sphere moved by `offset`
    #[inline]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self::new(self.center + offset, self.radius)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Corners may be given in any order
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box of the given full size centered on `center`
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        Self::new(center - size / 2.0, center + size / 2.0)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Smallest sphere around the box center that contains every corner
    pub fn bounding_sphere(&self) -> Sphere {
        Sphere::new(self.center(), self.half_extents().length())
    }
}

/// Collider shape as authored; resolved to a sphere when the collider is built
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Box(Aabb),
}

impl Shape {
    pub fn into_sphere(self) -> Sphere {
        match self {
            Shape::Sphere(sphere) => sphere,
            Shape::Box(aabb) => aabb.bounding_sphere(),
        }
    }
}

impl From<Shape> for Sphere {
    fn from(shape: Shape) -> Self {
        shape.into_sphere()
    }
}

/// Every live entity except the one being updated.
///
/// Borrowed from the scene for the duration of a single update call.
#[derive(Debug, Clone, Copy)]
pub struct Others<'a> {
    before: &'a [Entity],
    after: &'a [Entity],
}

impl<'a> Others<'a> {
    pub fn new(before: &'a [Entity], after: &'a [Entity]) -> Self {
        Self { before, after }
    }

    /// Nobody else is around
    pub fn none() -> Self {
        Self::new(&[], &[])
    }

    pub fn iter(self) -> impl Iterator<Item = &'a Entity> {
        self.before.iter().chain(self.after.iter())
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(self, id: EntityId) -> Option<&'a Entity> {
        self.iter().find(|e| e.id() == id)
    }

    /// Entities whose collider intersects `volume`, skipping excluded types
    pub fn overlapping(self, volume: &Sphere, excluded: &[EntityType]) -> Vec<&'a Entity> {
        self.iter()
            .filter(|e| !excluded.contains(&e.entity_type()))
            .filter(|e| e.collider().is_some_and(|c| c.intersects(volume)))
            .collect()
    }
}

/// Something that rejected a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blocker {
    pub id: EntityId,
    pub entity_type: EntityType,
}

/// Result of a gated move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Position and collider both advanced by the displacement
    Moved,
    /// Nothing changed; these entities were in the way
    Blocked(Vec<Blocker>),
}

impl MoveOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, MoveOutcome::Blocked(_))
    }
}

/// Try to move an entity by `displacement`.
///
/// Either the whole displacement is committed to position, collider and
/// renderable, or nothing changes. Entities without a collider always move.
pub fn try_move(
    core: &mut EntityCore,
    displacement: Vec3,
    others: Others<'_>,
    excluded: &[EntityType],
) -> MoveOutcome {
    if let Some(collider) = core.collider() {
        let testing = collider.translated(displacement);
        let blockers: Vec<Blocker> = others
            .overlapping(&testing, excluded)
            .into_iter()
            .map(|e| Blocker {
                id: e.id(),
                entity_type: e.entity_type(),
            })
            .collect();

        if !blockers.is_empty() {
            return MoveOutcome::Blocked(blockers);
        }
    }

    core.commit_move(displacement);
    MoveOutcome::Moved
}
