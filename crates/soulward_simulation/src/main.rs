//! Headless симуляция SOULWARD
//!
//! Патрульный агент + неподвижная цель на плоском полу, без рендера.
//! Профиль можно передать первым аргументом (TOML), иначе brute.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use tracing_subscriber::EnvFilter;

use soulward_simulation::config::presets;
use soulward_simulation::path::{PathConfig, Waypoint, WaypointAction};
use soulward_simulation::{
    create_headless_app, logger, spawn_agent, spawn_target, AgentProfile, Health,
    MovementConfig, PathFollower, Perception, SimulationPlugin, StaticGeometry, SurfaceTag,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("soulward=info")),
        )
        .init();

    let profile = match std::env::args().nth(1) {
        Some(path) => match AgentProfile::load(&path) {
            Ok(profile) => profile,
            Err(err) => {
                logger::log_error(&format!("❌ Failed to load profile {}: {}", path, err));
                std::process::exit(1);
            }
        },
        None => presets::brute(),
    };

    let seed = 42;
    logger::log_info(&format!(
        "🚀 Starting SOULWARD headless simulation (seed: {}, profile: {})",
        seed, profile.name
    ));

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / 60.0,
        )))
        .insert_resource(StaticGeometry::new().with_floor(0.0, 50.0, SurfaceTag::Environment));

    let profile = if profile.path.is_some() {
        profile
    } else {
        profile.with_path(
            PathConfig::new(vec![
                Waypoint::walk(Vec3::new(0.0, 0.0, 0.0)),
                Waypoint::new(Vec3::new(8.0, 0.0, 0.0), WaypointAction::Rest),
                Waypoint::new(Vec3::new(8.0, 0.0, -8.0), WaypointAction::Scan),
                Waypoint::walk(Vec3::new(0.0, 0.0, -8.0)),
            ])
            .with_max_cycles(-1),
        )
    };

    let (agent, target) = {
        let mut commands = app.world_mut().commands();
        let agent = spawn_agent(&mut commands, &profile, Vec3::ZERO);
        let target = spawn_target(&mut commands, Vec3::new(14.0, 0.0, -4.0), MovementConfig::default());
        (agent, target)
    };
    app.world_mut().flush();

    for tick in 0..1000 {
        app.update();

        if tick % 100 == 0 {
            let world = app.world();
            let position = world.get::<Transform>(agent).map(|t| t.translation);
            let detected = world.get::<Perception>(agent).map(|p| p.detected);
            let path = world.get::<PathFollower>(agent).map(|p| (p.status(), p.index()));
            let target_health = world.get::<Health>(target).map(|h| h.current);
            logger::log_info(&format!(
                "⏱️ Tick {}: agent at {:?}, detected {:?}, path {:?}, target health {:?}",
                tick, position, detected, path, target_health
            ));
        }
    }

    logger::log_info("✅ Simulation complete!");
}
