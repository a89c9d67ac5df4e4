//! Tests for combat systems.

use std::time::Duration;

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;

use super::health::*;
use super::stun::Stun;
use super::systems::*;
use crate::locomotion::{KinematicController, MovementConfig};

fn combat_world() -> World {
    let mut world = World::new();
    let mut time = Time::<Fixed>::default();
    time.advance_by(Duration::from_secs_f64(1.0 / 60.0));
    world.insert_resource(time);
    world.init_resource::<Events<EntityDied>>();
    world
}

#[test]
fn test_death_marks_and_reports_once() {
    let mut world = combat_world();
    let killer = world.spawn_empty().id();
    let victim = world
        .spawn((
            Health {
                current: 0.0,
                ..Health::new(50.0)
            },
            LastAttacker(killer),
        ))
        .id();

    world.run_system_once(detect_deaths).expect("system runs");
    world.run_system_once(detect_deaths).expect("system runs");

    assert!(world.get::<Dead>(victim).is_some());
    assert!(world.get::<DespawnAfter>(victim).is_some());

    let events = world.resource::<Events<EntityDied>>();
    let mut cursor = events.get_cursor();
    let died: Vec<_> = cursor.read(events).cloned().collect();
    assert_eq!(died.len(), 1);
    assert_eq!(died[0].entity, victim);
    assert_eq!(died[0].killer, Some(killer));
}

#[test]
fn test_no_decay_keeps_body() {
    let mut world = combat_world();
    let victim = world
        .spawn(Health {
            current: 0.0,
            decay_time: None,
            ..default()
        })
        .id();

    world.run_system_once(detect_deaths).expect("system runs");
    assert!(world.get::<Dead>(victim).is_some());
    assert!(world.get::<DespawnAfter>(victim).is_none());
}

#[test]
fn test_despawn_after_timeout() {
    let mut world = combat_world();
    let body = world.spawn(DespawnAfter { remaining: 0.05 }).id();

    // 0.05s = 3 тика по 1/60
    world.run_system_once(despawn_after_timeout).expect("system runs");
    world.run_system_once(despawn_after_timeout).expect("system runs");
    assert!(world.get_entity(body).is_ok());

    world.run_system_once(despawn_after_timeout).expect("system runs");
    assert!(world.get_entity(body).is_err());
}

#[test]
fn test_void_drains_health() {
    let mut world = combat_world();
    let config = MovementConfig::default();
    let falling = world
        .spawn((
            KinematicController {
                in_void: true,
                ..KinematicController::new(&config)
            },
            config,
            Health::default(),
        ))
        .id();

    world.run_system_once(apply_void_damage).expect("system runs");

    let health = world.get::<Health>(falling).map(|h| h.current);
    // 100 / 2s / 60Hz
    assert!(health.is_some_and(|h| (h - (100.0 - 100.0 / 120.0)).abs() < 1e-3));
}

#[test]
fn test_stunned_target_holds_still() {
    let mut world = combat_world();
    let config = MovementConfig::default();
    let mut stun = Stun::default();
    stun.try_stun(1.0);
    let target = world
        .spawn((
            KinematicController {
                velocity: Vec3::new(3.0, -1.0, 2.0),
                ..KinematicController::new(&config)
            },
            config,
            stun,
        ))
        .id();

    world.run_system_once(tick_stuns).expect("system runs");

    let velocity = world.get::<KinematicController>(target).map(|c| c.velocity);
    assert_eq!(velocity, Some(Vec3::new(0.0, -1.0, 0.0)));
}
