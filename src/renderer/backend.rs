//! Render backend interface

use super::{Camera, Renderable};
use crate::sim::{Entity, EntityId};

/// Receives scene graph changes and frame submissions.
///
/// A GPU implementation lives outside this crate; [`HeadlessBackend`] only
/// keeps bookkeeping so runs can be inspected.
pub trait RenderBackend {
    /// A loaded entity joined the scene
    fn attach(&mut self, id: EntityId, renderable: &Renderable);

    /// An entity left the scene; its renderable is about to be released
    fn detach(&mut self, id: EntityId);

    /// Viewport changed size
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Draw the current frame
    fn render(&mut self, camera: &Camera, entities: &[Entity]);
}

/// Backend that renders nothing and records what it was told
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    attached: Vec<EntityId>,
    detached: Vec<EntityId>,
    frames: u64,
    last_part_count: usize,
    last_camera: Option<Camera>,
    viewport: Option<(u32, u32)>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities currently attached, in attach order
    pub fn attached(&self) -> &[EntityId] {
        &self.attached
    }

    /// Every entity ever detached, in detach order
    pub fn detached(&self) -> &[EntityId] {
        &self.detached
    }

    pub fn is_attached(&self, id: EntityId) -> bool {
        self.attached.contains(&id)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Render parts submitted in the last frame
    pub fn last_part_count(&self) -> usize {
        self.last_part_count
    }

    pub fn last_camera(&self) -> Option<&Camera> {
        self.last_camera.as_ref()
    }

    pub fn viewport(&self) -> Option<(u32, u32)> {
        self.viewport
    }
}

impl RenderBackend for HeadlessBackend {
    fn attach(&mut self, id: EntityId, _renderable: &Renderable) {
        if self.attached.contains(&id) {
            log::warn!("entity {} attached twice", id);
            return;
        }
        self.attached.push(id);
    }

    fn detach(&mut self, id: EntityId) {
        self.attached.retain(|a| *a != id);
        self.detached.push(id);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Some((width, height));
    }

    fn render(&mut self, camera: &Camera, entities: &[Entity]) {
        self.frames += 1;
        self.last_part_count = entities.iter().map(|e| e.renderable().parts.len()).sum();
        self.last_camera = Some(camera.clone());
    }
}
