//! Combat integration test
//!
//! Агент догоняет цель и добивает её melee hook'ом headless.
//!
//! Проверяем:
//! - AttackFired + DamageDealt на каждый удар, cooldown соблюдается
//! - EntityDied ровно один раз, killer = агент
//! - Тело убирается после decay_time

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use soulward_simulation::config::presets;
use soulward_simulation::*;

#[derive(Resource, Default)]
struct CombatLog {
    attacks: Vec<AttackFired>,
    hits: Vec<DamageDealt>,
    deaths: Vec<EntityDied>,
}

fn record_combat(
    mut attacks: EventReader<AttackFired>,
    mut hits: EventReader<DamageDealt>,
    mut deaths: EventReader<EntityDied>,
    mut log: ResMut<CombatLog>,
) {
    log.attacks.extend(attacks.read().copied());
    log.hits.extend(hits.read().cloned());
    log.deaths.extend(deaths.read().cloned());
}

/// Helper: полный combat App на плоском полу
fn create_combat_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / 60.0,
        )))
        .insert_resource(StaticGeometry::new().with_floor(0.0, 60.0, SurfaceTag::Environment))
        .init_resource::<CombatLog>()
        .add_systems(Last, record_combat);
    app
}

fn spawn_duel(app: &mut App) -> (Entity, Entity) {
    let pair = {
        let mut commands = app.world_mut().commands();
        let agent = spawn_agent(&mut commands, &presets::brute(), Vec3::ZERO);
        let target = spawn_target(&mut commands, Vec3::new(0.0, 0.0, -4.0), MovementConfig::default());
        (agent, target)
    };
    app.world_mut().flush();
    pair
}

#[test]
fn test_agent_kills_target() {
    let mut app = create_combat_app(42);
    let (agent, target) = spawn_duel(&mut app);

    // 30 секунд игрового времени
    for _ in 0..1800 {
        app.update();
        if !app.world().resource::<CombatLog>().deaths.is_empty() {
            break;
        }
    }

    let log = app.world().resource::<CombatLog>();
    assert_eq!(log.deaths.len(), 1, "Цель должна умереть ровно один раз");
    assert_eq!(log.deaths[0].entity, target);
    assert_eq!(log.deaths[0].killer, Some(agent));

    // 100 HP / 25 урона
    assert!(log.hits.len() >= 4, "Ударов: {}", log.hits.len());
    assert!(log.hits.iter().all(|hit| hit.attacker == Some(agent)));
    assert_eq!(log.hits.iter().filter(|hit| hit.target_died).count(), 1);
    assert!(log.attacks.iter().all(|attack| attack.agent == agent && attack.target == target));

    assert!(app.world().get::<Dead>(target).is_some());
    assert!(app
        .world()
        .get::<Health>(target)
        .is_some_and(|health| !health.is_alive()));
}

#[test]
fn test_attack_cooldown_spaces_hits() {
    let mut app = create_combat_app(42);
    let (agent, _target) = spawn_duel(&mut app);

    let mut attack_ticks = Vec::new();
    for tick in 0..900 {
        let before = app.world().resource::<CombatLog>().attacks.len();
        app.update();
        let after = app.world().resource::<CombatLog>().attacks.len();
        if after > before {
            attack_ticks.push(tick);
        }
    }

    assert!(attack_ticks.len() >= 2, "Агент должен ударить хотя бы дважды");

    // cooldown 1.5s = 90 тиков
    let cooldown_ticks = (presets::brute().combat.attack_cooldown * 60.0) as usize;
    for pair in attack_ticks.windows(2) {
        assert!(
            pair[1] - pair[0] >= cooldown_ticks - 1,
            "Удары слишком часто: тики {:?}",
            pair
        );
    }

    assert!(app.world().get::<AttackTimer>(agent).is_some());
}

#[test]
fn test_dead_target_despawns_after_decay() {
    let mut app = create_combat_app(42);
    let (_agent, target) = spawn_duel(&mut app);

    app.world_mut()
        .entity_mut(target)
        .get_mut::<Health>()
        .unwrap()
        .kill();

    // decay_time 7s + запас
    for _ in 0..500 {
        app.update();
    }

    let log = app.world().resource::<CombatLog>();
    assert_eq!(log.deaths.len(), 1);
    assert_eq!(log.deaths[0].killer, None);
    assert!(app.world().get_entity(target).is_err(), "Тело должно быть убрано");
}
