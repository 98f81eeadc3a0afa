//! Tank Arena entry point
//!
//! Runs the simulation headless: bootstraps the arena from the in-memory
//! loader, plays a short scripted input sequence at a fixed step and logs
//! what happened. Pass a settings JSON path as the first argument to tune it.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::process::ExitCode;

    use futures::executor::block_on;
    use tank_arena::Settings;
    use tank_arena::assets::HeadlessLoader;
    use tank_arena::renderer::HeadlessBackend;
    use tank_arena::sim::{EntityType, FixedClock, InputEvent, Key, Scene};

    env_logger::init();
    log::info!("Tank Arena (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };

    let mut scene = match block_on(Scene::bootstrap(settings, &HeadlessLoader::new(), HeadlessBackend::new())) {
        Ok(scene) => scene,
        Err(err) => {
            log::error!("Bootstrap failed: {}", err);
            return ExitCode::FAILURE;
        }
    };

    // (frame, event) pairs at 60 fps: drive, turn, fire a few shots
    let script = [
        (0, InputEvent::KeyDown(Key::Up)),
        (30, InputEvent::KeyDown(Key::Fire)),
        (45, InputEvent::KeyDown(Key::Left)),
        (75, InputEvent::KeyUp(Key::Left)),
        (90, InputEvent::KeyDown(Key::Fire)),
        (120, InputEvent::KeyUp(Key::Up)),
        (121, InputEvent::KeyDown(Key::Right)),
        (150, InputEvent::KeyUp(Key::Right)),
        (150, InputEvent::KeyDown(Key::Fire)),
    ];
    let total_frames = 300;
    let mut clock = FixedClock::new(1.0 / 60.0);

    for frame in 0..total_frames {
        for (_, event) in script.iter().filter(|(at, _)| *at == frame) {
            scene.push_input(*event);
        }
        scene.frame(&mut clock);
    }

    if let Some(player) = scene.player() {
        log::info!(
            "Player at ({:.2}, {:.2}) facing {:.3} rad",
            player.position().x,
            player.position().y,
            player.as_player().map(|p| p.rotation()).unwrap_or_default()
        );
    }
    log::info!(
        "After {} frames: {} entities ({} enemies, {} projectiles), {} removed",
        scene.frame_count(),
        scene.entities().len(),
        scene.count(EntityType::Enemy),
        scene.count(EntityType::Bullet),
        scene.backend().detached().len()
    );
    ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The headless driver is native only; embedders call Scene::frame themselves
}
