//! Scene orchestrator
//!
//! Owns the live entity collection and drives the fixed per-frame sequence:
//!
//! 1. Prune: release entities flagged for disposal, then merge staged spawns
//! 2. Time step from the frame clock
//! 3. Update every active entity in order, then apply projectile hits
//! 4. Hand the frame to the render backend
//!
//! Entities never enter or leave the collection mid-pass. Anything spawned
//! during an update is staged and first updated in a later frame.

use std::fmt;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use futures::task::noop_waker_ref;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::Others;
use super::enemy::EnemyTank;
use super::entity::{Body, Entity, EntityId, EntityType, Lifecycle};
use super::input::{InputEvent, InputState};
use super::clock::FrameClock;
use super::map::{ArenaLayout, MapTile, Wall};
use super::player::PlayerTank;
use crate::assets::{AssetLoader, AssetResolver, ResourceManager};
use crate::error::{LoadError, SceneError};
use crate::random_heading;
use crate::renderer::{Camera, RenderBackend};
use crate::settings::Settings;

type LoadFuture = LocalBoxFuture<'static, Result<Entity, LoadError>>;

/// An entity whose asynchronous load has not been merged yet
pub struct StagedSpawn {
    pub id: EntityId,
    pub entity_type: EntityType,
    pub position: Vec3,
    load: LoadFuture,
}

impl fmt::Debug for StagedSpawn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedSpawn")
            .field("id", &self.id)
            .field("entity_type", &self.entity_type)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

/// Allocates ids and stages new entities
pub struct Spawner {
    assets: Rc<dyn AssetResolver>,
    rng: Pcg32,
    next_id: u32,
    staged: Vec<StagedSpawn>,
}

impl Spawner {
    pub fn new(assets: Rc<dyn AssetResolver>, rng: Pcg32) -> Self {
        Self {
            assets,
            rng,
            next_id: 1,
            staged: Vec::new(),
        }
    }

    pub(crate) fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Independent generator for one entity's load
    fn fork_rng(&mut self) -> Pcg32 {
        Pcg32::seed_from_u64(self.rng.random())
    }

    /// Stage an entity. Its load starts now and it joins the scene at the
    /// next prune that finds the load complete.
    pub fn spawn(&mut self, position: Vec3, body: Body) -> EntityId {
        let id = self.allocate_id();
        let entity_type = body.entity_type();
        let assets = Rc::clone(&self.assets);
        let mut rng = self.fork_rng();

        let load = async move {
            let mut entity = Entity::new(id, position, body);
            entity.load(assets.as_ref(), &mut rng).await?;
            Ok(entity)
        }
        .boxed_local();

        log::trace!("Staged {:?} {} at {:?}", entity_type, id, position);
        self.staged.push(StagedSpawn {
            id,
            entity_type,
            position,
            load,
        });
        id
    }

    pub fn staged(&self) -> &[StagedSpawn] {
        &self.staged
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn assets(&self) -> Rc<dyn AssetResolver> {
        Rc::clone(&self.assets)
    }

    fn take_staged(&mut self) -> Vec<StagedSpawn> {
        std::mem::take(&mut self.staged)
    }

    fn restage(&mut self, spawn: StagedSpawn) {
        self.staged.push(spawn);
    }
}

/// A projectile connecting with an enemy, applied after the update pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub target: EntityId,
    pub amount: i32,
}

/// Everything an entity may touch while it updates
pub struct FrameContext<'a> {
    /// Every other entity in the scene
    pub others: Others<'a>,
    pub spawner: &'a mut Spawner,
    pub input: &'a InputState,
    pub camera: &'a mut Camera,
    pub settings: &'a Settings,
    hits: &'a mut Vec<Hit>,
}

impl<'a> FrameContext<'a> {
    pub(crate) fn new(
        others: Others<'a>,
        spawner: &'a mut Spawner,
        input: &'a InputState,
        camera: &'a mut Camera,
        settings: &'a Settings,
        hits: &'a mut Vec<Hit>,
    ) -> Self {
        Self {
            others,
            spawner,
            input,
            camera,
            settings,
            hits,
        }
    }

    pub fn report_hit(&mut self, target: EntityId, amount: i32) {
        self.hits.push(Hit { target, amount });
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        self.spawner.rng()
    }
}

/// The running game
pub struct Scene<B: RenderBackend> {
    settings: Settings,
    entities: Vec<Entity>,
    spawner: Spawner,
    input: InputState,
    pending_input: Vec<InputEvent>,
    camera: Camera,
    backend: B,
    player: Option<EntityId>,
    hits: Vec<Hit>,
    frame_count: u64,
}

impl<B: RenderBackend> Scene<B> {
    /// Empty scene over already-loaded resources
    pub fn new(settings: Settings, assets: Rc<dyn AssetResolver>, mut backend: B) -> Self {
        let rng = Pcg32::seed_from_u64(settings.seed);
        let camera = Camera::new(settings.aspect_ratio());
        backend.resize(settings.viewport_width, settings.viewport_height);
        Self {
            spawner: Spawner::new(assets, rng),
            settings,
            entities: Vec::new(),
            input: InputState::default(),
            pending_input: Vec::new(),
            camera,
            backend,
            player: None,
            hits: Vec::new(),
            frame_count: 0,
        }
    }

    /// Load every resource, then build the arena. Any load failure aborts.
    pub async fn bootstrap(settings: Settings, loader: &impl AssetLoader, backend: B) -> Result<Self, SceneError> {
        log::info!("Bootstrapping scene (seed {:#x})", settings.seed);
        let resources = ResourceManager::load(loader).await?;
        let mut scene = Self::new(settings, Rc::new(resources), backend);
        scene.populate().await?;
        log::info!(
            "Scene ready: {} entities, {} enemies",
            scene.entities.len(),
            scene.count(EntityType::Enemy)
        );
        Ok(scene)
    }

    /// Place tiles, walls, the player and enemies from an [`ArenaLayout`]
    pub async fn populate(&mut self) -> Result<(), SceneError> {
        let layout = ArenaLayout::new(self.settings.map_size, self.settings.enemy_count, self.spawner.rng());
        log::debug!(
            "Arena {}x{}: {} tiles, {} walls, {} enemy spawns",
            layout.size,
            layout.size,
            layout.tiles.len(),
            layout.walls.len(),
            layout.enemy_spawns.len()
        );

        for position in &layout.tiles {
            let tile = self.load_entity(*position, Body::MapTile(MapTile)).await?;
            self.add_to_scene(tile)?;
        }

        for position in &layout.walls {
            let wall = self.load_entity(*position, Body::Wall(Wall::default())).await?;
            self.add_to_scene(wall)?;
        }

        let player = PlayerTank::new(self.settings.player_move_speed);
        let player = self.load_entity(layout.player_spawn, Body::Player(player)).await?;
        self.add_to_scene(player)?;
        self.camera.follow(layout.player_spawn);

        for position in &layout.enemy_spawns {
            let enemy = EnemyTank::from_settings(random_heading(self.spawner.rng()), &self.settings);
            let enemy = self.load_entity(*position, Body::Enemy(enemy)).await?;
            self.add_to_scene(enemy)?;
        }
        Ok(())
    }

    /// Construct and load an entity without adding it to the scene
    pub async fn load_entity(&mut self, position: Vec3, body: Body) -> Result<Entity, LoadError> {
        let id = self.spawner.allocate_id();
        let mut rng = self.spawner.fork_rng();
        let assets = self.spawner.assets();
        let mut entity = Entity::new(id, position, body);
        entity.load(assets.as_ref(), &mut rng).await?;
        Ok(entity)
    }

    /// Attach a loaded entity and make it live immediately
    pub fn add_to_scene(&mut self, mut entity: Entity) -> Result<EntityId, SceneError> {
        let id = entity.id();
        if entity.state() != Lifecycle::Loaded {
            return Err(SceneError::NotLoaded(id));
        }

        self.backend.attach(id, entity.renderable());
        entity.activate();
        if entity.entity_type() == EntityType::Player && self.player.is_none() {
            self.player = Some(id);
        }
        log::trace!("Added {} {}", entity.kind_name(), id);
        self.entities.push(entity);
        Ok(id)
    }

    /// Stage an entity to join at the next frame
    pub fn spawn(&mut self, position: Vec3, body: Body) -> EntityId {
        self.spawner.spawn(position, body)
    }

    /// Queue an input event for the next update pass
    pub fn push_input(&mut self, event: InputEvent) {
        self.pending_input.push(event);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        self.backend.resize(width, height);
    }

    /// Run one full frame
    pub fn frame(&mut self, clock: &mut impl FrameClock) {
        self.prune();
        let dt = clock.delta();
        self.update(dt);
        self.render();
        self.frame_count += 1;
    }

    /// Damage a live enemy. Returns true when this destroyed it.
    pub fn damage(&mut self, id: EntityId, amount: i32) -> bool {
        match self.entities.iter_mut().find(|e| e.id() == id) {
            Some(entity) => entity.damage(amount, &mut self.spawner),
            None => {
                log::debug!("Damage to unknown entity {} ignored", id);
                false
            }
        }
    }

    fn prune(&mut self) {
        let (disposed, live): (Vec<Entity>, Vec<Entity>) =
            std::mem::take(&mut self.entities).into_iter().partition(Entity::should_dispose);
        self.entities = live;

        for mut entity in disposed {
            let id = entity.id();
            self.backend.detach(id);
            let released = entity.dispose();
            log::debug!("Removed {} {} ({} parts released)", entity.kind_name(), id, released);
            if self.player == Some(id) {
                log::info!("Player {} removed", id);
                self.player = None;
            }
        }

        self.merge_staged();
    }

    fn merge_staged(&mut self) {
        let mut cx = Context::from_waker(noop_waker_ref());
        for mut spawn in self.spawner.take_staged() {
            match spawn.load.poll_unpin(&mut cx) {
                Poll::Ready(Ok(entity)) => {
                    if let Err(err) = self.add_to_scene(entity) {
                        log::error!("Staged entity {} rejected: {}", spawn.id, err);
                    }
                }
                Poll::Ready(Err(err)) => {
                    log::error!("Failed to load {:?} {}: {}", spawn.entity_type, spawn.id, err);
                }
                Poll::Pending => self.spawner.restage(spawn),
            }
        }
    }

    fn update(&mut self, dt: f32) {
        for event in self.pending_input.drain(..) {
            self.input.apply(event);
        }

        for index in 0..self.entities.len() {
            let (before, rest) = self.entities.split_at_mut(index);
            let Some((entity, after)) = rest.split_first_mut() else {
                break;
            };
            let mut ctx = FrameContext::new(
                Others::new(before, after),
                &mut self.spawner,
                &self.input,
                &mut self.camera,
                &self.settings,
                &mut self.hits,
            );
            entity.update(dt, &mut ctx);
        }

        for hit in std::mem::take(&mut self.hits) {
            self.damage(hit.target, hit.amount);
        }
        self.input.end_frame();
    }

    fn render(&mut self) {
        self.backend.render(&self.camera, &self.entities);
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn player(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.entity(id))
    }

    /// Live entities of one type
    pub fn count(&self, entity_type: EntityType) -> usize {
        self.entities.iter().filter(|e| e.entity_type() == entity_type).count()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn staged(&self) -> &[StagedSpawn] {
        self.spawner.staged()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::HeadlessLoader;
    use crate::sim::clock::FixedClock;
    use crate::sim::effect::{Effect, EffectKind};
    use crate::sim::input::Key;
    use crate::sim::testing;
    use crate::renderer::HeadlessBackend;
    use futures::executor::block_on;

    fn empty_scene() -> Scene<HeadlessBackend> {
        Scene::new(Settings::default(), testing::resources(), HeadlessBackend::new())
    }

    fn add(scene: &mut Scene<HeadlessBackend>, position: Vec3, body: Body) -> EntityId {
        let entity = block_on(scene.load_entity(position, body)).unwrap();
        scene.add_to_scene(entity).unwrap()
    }

    fn explosions(scene: &Scene<HeadlessBackend>) -> usize {
        scene
            .entities()
            .iter()
            .filter(|e| e.as_effect().is_some_and(|f| f.kind() == EffectKind::Explosion))
            .count()
    }

    #[test]
    fn test_bootstrap_builds_the_arena() {
        let settings = Settings::default();
        let scene = block_on(Scene::bootstrap(settings.clone(), &HeadlessLoader::new(), HeadlessBackend::new())).unwrap();

        let size = settings.map_size as usize;
        assert_eq!(scene.count(EntityType::Player), 1);
        assert_eq!(scene.count(EntityType::Enemy), settings.enemy_count as usize);
        assert_eq!(
            scene.count(EntityType::General),
            size * size + 4 * (size + 1)
        );
        assert_eq!(scene.backend().attached().len(), scene.entities().len());
        assert!(scene.entities().iter().all(Entity::is_active));

        let player = scene.player().unwrap();
        assert_eq!(scene.camera().position.x, player.position().x);
        assert_eq!(scene.camera().position.y, player.position().y);
        assert_eq!(scene.backend().viewport(), Some((1280, 720)));
    }

    #[test]
    fn test_bootstrap_fails_without_tank_model() {
        let loader = HeadlessLoader::new().with_missing("models/tank.glb");
        let result = block_on(Scene::bootstrap(Settings::default(), &loader, HeadlessBackend::new()));
        assert!(matches!(
            result,
            Err(SceneError::Load(LoadError::Source { ref path, .. })) if path == "models/tank.glb"
        ));
    }

    #[test]
    fn test_add_to_scene_requires_loaded_entity() {
        let mut scene = empty_scene();
        let unloaded = Entity::new(EntityId(99), Vec3::ZERO, Body::Wall(Wall::default()));
        let err = scene.add_to_scene(unloaded).unwrap_err();
        assert!(matches!(err, SceneError::NotLoaded(EntityId(99))));
        assert!(scene.entities().is_empty());
    }

    #[test]
    fn test_spawned_entity_joins_next_frame() {
        let mut scene = empty_scene();
        let id = scene.spawn(Vec3::ZERO, Body::Effect(Effect::shoot(0.0)));
        assert_eq!(scene.staged().len(), 1);
        assert!(scene.entity(id).is_none());

        scene.frame(&mut FixedClock::new(0.25));

        assert!(scene.staged().is_empty());
        assert!(scene.backend().is_attached(id));
        // merged during prune, so it took part in this frame's update
        let effect = scene.entity(id).unwrap().as_effect().unwrap();
        assert_eq!(effect.remaining_duration(), 0.75);
    }

    #[test]
    fn test_disposed_entities_are_gone_next_frame() {
        let mut scene = empty_scene();
        let id = scene.spawn(Vec3::ZERO, Body::Effect(Effect::shoot(0.0)));
        let mut clock = FixedClock::new(0.6);

        scene.frame(&mut clock);
        assert!(!scene.entity(id).unwrap().should_dispose());

        scene.frame(&mut clock);
        // expired this frame: still present, flagged, no longer updated
        let flagged = scene.entity(id).unwrap();
        assert!(flagged.should_dispose());
        let remaining = flagged.as_effect().unwrap().remaining_duration();

        scene.frame(&mut clock);
        assert!(scene.entity(id).is_none());
        assert_eq!(scene.backend().detached(), &[id]);
        assert!(!scene.backend().is_attached(id));
        assert!(remaining <= 0.0);
    }

    #[test]
    fn test_lethal_damage_registers_exactly_one_explosion() {
        let mut scene = empty_scene();
        let enemy = add(&mut scene, Vec3::new(4.0, 4.0, 0.0), Body::Enemy(EnemyTank::new(0.0, 1.0, 100)));

        assert!(scene.damage(enemy, 100));
        assert!(scene.entity(enemy).unwrap().should_dispose());
        assert!(!scene.damage(enemy, 100));
        assert_eq!(scene.staged().len(), 1);
        assert_eq!(scene.staged()[0].position, Vec3::new(4.0, 4.0, 0.0));

        scene.frame(&mut FixedClock::new(0.1));
        assert!(scene.entity(enemy).is_none());
        assert_eq!(explosions(&scene), 1);
    }

    #[test]
    fn test_negative_damage_is_absorbed() {
        let mut scene = empty_scene();
        let enemy = add(&mut scene, Vec3::ZERO, Body::Enemy(EnemyTank::new(0.0, 1.0, 100)));

        assert!(!scene.damage(enemy, i32::MIN));
        assert_eq!(scene.entity(enemy).unwrap().as_enemy().unwrap().life(), i32::MAX);
        assert!(scene.staged().is_empty());
    }

    #[test]
    fn test_fire_latch_fires_once_per_frame() {
        let mut scene = empty_scene();
        add(&mut scene, Vec3::new(5.0, 5.0, 0.0), Body::Player(PlayerTank::new(2.0)));

        scene.push_input(InputEvent::KeyDown(Key::Fire));
        scene.push_input(InputEvent::KeyUp(Key::Fire));
        scene.push_input(InputEvent::KeyDown(Key::Fire));
        scene.frame(&mut FixedClock::new(0.1));

        let shells = scene.staged().iter().filter(|s| s.entity_type == EntityType::Bullet).count();
        assert_eq!(shells, 1);
        assert!(!scene.input().fire);

        // no new press: nothing more fires
        scene.frame(&mut FixedClock::new(0.1));
        assert_eq!(scene.count(EntityType::Bullet), 1);
        assert!(scene.staged().is_empty());
    }

    #[test]
    fn test_projectile_first_updates_the_frame_after_firing() {
        let mut scene = empty_scene();
        add(&mut scene, Vec3::new(5.0, 5.0, 0.0), Body::Player(PlayerTank::new(2.0)));
        let mut clock = FixedClock::new(0.25);

        scene.push_input(InputEvent::KeyDown(Key::Fire));
        scene.frame(&mut clock);
        scene.frame(&mut clock);

        let shell = scene
            .entities()
            .iter()
            .find(|e| e.entity_type() == EntityType::Bullet)
            .unwrap();
        // muzzle at y = 4.7, then one step of 4 * 0.25
        assert!((shell.position() - Vec3::new(5.0, 3.7, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_projectile_hit_destroys_enemy() {
        let mut scene = empty_scene();
        add(&mut scene, Vec3::new(5.0, 5.0, 0.0), Body::Player(PlayerTank::new(2.0)));
        let enemy = add(&mut scene, Vec3::new(5.0, 3.5, 0.0), Body::Enemy(EnemyTank::new(0.0, 0.0, 25)));
        let mut clock = FixedClock::new(0.1);

        scene.push_input(InputEvent::KeyDown(Key::Fire));
        for _ in 0..10 {
            scene.frame(&mut clock);
        }

        assert!(scene.entity(enemy).is_none());
        assert!(scene.backend().detached().contains(&enemy));
        assert_eq!(explosions(&scene), 1);
        assert_eq!(scene.count(EntityType::Bullet), 0);
    }

    #[test]
    fn test_resize_updates_camera_and_backend() {
        let mut scene = empty_scene();
        scene.resize(800, 400);
        assert_eq!(scene.camera().aspect, 2.0);
        assert_eq!(scene.backend().viewport(), Some((800, 400)));
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let mut scene =
                block_on(Scene::bootstrap(Settings::default(), &HeadlessLoader::new(), HeadlessBackend::new())).unwrap();
            let mut clock = FixedClock::new(1.0 / 60.0);
            scene.push_input(InputEvent::KeyDown(Key::Up));
            scene.push_input(InputEvent::KeyDown(Key::Left));
            for frame in 0..120 {
                if frame % 30 == 0 {
                    scene.push_input(InputEvent::KeyDown(Key::Fire));
                }
                scene.frame(&mut clock);
            }
            scene
                .entities()
                .iter()
                .map(|e| (e.id(), e.position(), e.as_enemy().map(EnemyTank::rotation)))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_frames_reach_the_backend() {
        let mut scene = empty_scene();
        add(&mut scene, Vec3::ZERO, Body::Wall(Wall::default()));
        scene.frame(&mut FixedClock::new(0.1));
        scene.frame(&mut FixedClock::new(0.1));
        assert_eq!(scene.frame_count(), 2);
        assert_eq!(scene.backend().frames_rendered(), 2);
        assert_eq!(scene.backend().last_part_count(), 1);
    }
}
