//! Patrol integration test
//!
//! Полный headless App (SimulationPlugin + StaticGeometry пол):
//! - маршрут проходится по порядку и завершается после max_cycles
//! - обнаружение снимает агента с маршрута, потеря возвращает
//! - цель в safe zone не обнаруживается

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use soulward_simulation::config::presets;
use soulward_simulation::path::PathEvent;
use soulward_simulation::*;

/// Все события типа E за прогон
#[derive(Resource)]
struct Recorded<E: Event + Clone>(Vec<E>);

impl<E: Event + Clone> Default for Recorded<E> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

fn record<E: Event + Clone>(mut reader: EventReader<E>, mut recorded: ResMut<Recorded<E>>) {
    recorded.0.extend(reader.read().cloned());
}

fn create_patrol_app(geometry: StaticGeometry) -> App {
    let mut app = create_headless_app(7);
    app.add_plugins(SimulationPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / 60.0,
        )))
        .insert_resource(geometry)
        .init_resource::<Recorded<PathProgressed>>()
        .init_resource::<Recorded<DetectionChanged>>()
        .add_systems(
            Last,
            (record::<PathProgressed>, record::<DetectionChanged>),
        );
    app
}

fn flat_floor() -> StaticGeometry {
    StaticGeometry::new().with_floor(0.0, 50.0, SurfaceTag::Environment)
}

fn spawn_with<F: FnOnce(&mut Commands) -> R, R>(app: &mut App, spawn: F) -> R {
    let result = {
        let mut commands = app.world_mut().commands();
        spawn(&mut commands)
    };
    app.world_mut().flush();
    result
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

fn edges(app: &App) -> Vec<DetectionEdge> {
    app.world()
        .resource::<Recorded<DetectionChanged>>()
        .0
        .iter()
        .map(|event| event.edge)
        .collect()
}

#[test]
fn test_patrol_visits_waypoints_then_terminates() {
    let mut app = create_patrol_app(flat_floor());

    let profile = presets::brute().with_path(
        PathConfig::new(vec![
            Waypoint::walk(Vec3::ZERO),
            Waypoint::walk(Vec3::new(4.0, 0.0, 0.0)),
            Waypoint::walk(Vec3::new(4.0, 0.0, 4.0)),
        ])
        .with_max_cycles(1),
    );
    let agent = spawn_with(&mut app, |commands| spawn_agent(commands, &profile, Vec3::ZERO));

    run_ticks(&mut app, 1200);

    let events = &app.world().resource::<Recorded<PathProgressed>>().0;
    let arrivals: Vec<usize> = events
        .iter()
        .filter_map(|event| match event.event {
            PathEvent::Arrived { index, .. } => Some(index),
            _ => None,
        })
        .collect();
    let terminations = events
        .iter()
        .filter(|event| event.event == PathEvent::Terminated)
        .count();

    assert_eq!(arrivals, vec![0, 1, 2]);
    assert_eq!(terminations, 1, "Termination должен прийти ровно один раз");

    let world = app.world();
    assert_eq!(
        world.get::<PathFollower>(agent).map(|path| path.status()),
        Some(PathStatus::Terminated)
    );

    let position = world.get::<Transform>(agent).map(|t| t.translation).unwrap();
    let flat = Vec3::new(position.x, 0.0, position.z);
    assert!(
        flat.distance(Vec3::new(4.0, 0.0, 4.0)) < 2.0,
        "Агент должен остаться у последней точки, а он в {:?}",
        position
    );
    assert!(position.y > -0.5, "Агент провалился сквозь пол: {:?}", position);
}

#[test]
fn test_forced_detection_suspends_then_loss_resumes_path() {
    let mut app = create_patrol_app(flat_floor());

    // Stationary: при отслеживании агент стоит, цель далеко и не видна
    let profile = presets::sentry().with_path(PathConfig::new(vec![
        Waypoint::walk(Vec3::ZERO),
        Waypoint::walk(Vec3::new(3.0, 0.0, 0.0)),
    ]));
    let (agent, target) = spawn_with(&mut app, |commands| {
        let agent = spawn_agent(commands, &profile, Vec3::ZERO);
        let target = spawn_target(commands, Vec3::new(0.0, 0.0, 30.0), MovementConfig::default());
        (agent, target)
    });

    run_ticks(&mut app, 10);
    assert!(edges(&app).is_empty());

    app.world_mut().send_event(AgentRequest::FindTarget { agent });
    run_ticks(&mut app, 2);

    assert_eq!(edges(&app), vec![DetectionEdge::Detected]);
    assert_eq!(
        app.world().get::<PathFollower>(agent).map(|path| path.status()),
        Some(PathStatus::Suspended)
    );
    assert_eq!(
        app.world().get::<DetectionTarget>(target).map(|t| t.detection_count),
        Some(1)
    );

    // search_time 3s при 60 тиках/с
    run_ticks(&mut app, 300);

    assert_eq!(edges(&app), vec![DetectionEdge::Detected, DetectionEdge::Lost]);
    assert_eq!(
        app.world().get::<PathFollower>(agent).map(|path| path.status()),
        Some(PathStatus::OnPath)
    );
    assert_eq!(
        app.world().get::<DetectionTarget>(target).map(|t| t.detection_count),
        Some(0)
    );
}

#[test]
fn test_visible_target_detected_once() {
    let mut app = create_patrol_app(flat_floor());

    let (agent, target) = spawn_with(&mut app, |commands| {
        let agent = spawn_agent(commands, &presets::sentry(), Vec3::ZERO);
        // Transform::forward() = -Z
        let target = spawn_target(commands, Vec3::new(0.0, 0.0, -5.0), MovementConfig::default());
        (agent, target)
    });

    run_ticks(&mut app, 120);

    assert_eq!(edges(&app), vec![DetectionEdge::Detected]);
    assert_eq!(app.world().get::<Perception>(agent).map(|p| p.detected), Some(true));
    assert_eq!(
        app.world().get::<AgentPresentation>(agent).map(|p| p.tracking),
        Some(true)
    );
    assert_eq!(
        app.world().get::<DetectionTarget>(target).map(|t| t.detection_count),
        Some(1)
    );
}

#[test]
fn test_target_in_safe_zone_is_ignored() {
    // Площадка safe zone под целью, выше основного пола
    let geometry = flat_floor().with_box(
        Vec3::new(0.0, 0.05, -5.0),
        Vec3::new(1.5, 0.05, 1.5),
        SurfaceTag::SafeEnvironment,
    );
    let mut app = create_patrol_app(geometry);

    let (agent, target) = spawn_with(&mut app, |commands| {
        let agent = spawn_agent(commands, &presets::sentry(), Vec3::ZERO);
        let target = spawn_target(commands, Vec3::new(0.0, 0.1, -5.0), MovementConfig::default());
        (agent, target)
    });

    run_ticks(&mut app, 120);

    assert!(
        app.world().get::<DetectionTarget>(target).is_some_and(|t| t.safe),
        "Цель на SafeEnvironment должна быть в безопасности"
    );
    assert_eq!(app.world().get::<Perception>(agent).map(|p| p.detected), Some(false));
    assert_eq!(
        app.world().get::<DetectionTarget>(target).map(|t| t.detection_count),
        Some(0)
    );
}

#[test]
fn test_tracked_target_latched_when_lower_index_target_appears() {
    let mut app = create_patrol_app(flat_floor());

    // Занимает меньший индекс, целью становится позже
    let (latecomer, agent, target) = spawn_with(&mut app, |commands| {
        let latecomer = commands.spawn(Transform::from_xyz(0.0, 0.0, 100.0)).id();
        let agent = spawn_agent(commands, &presets::sentry(), Vec3::ZERO);
        let target = spawn_target(commands, Vec3::new(0.0, 0.0, -5.0), MovementConfig::default());
        (latecomer, agent, target)
    });
    assert!(latecomer.index() < target.index());

    run_ticks(&mut app, 30);
    assert_eq!(edges(&app), vec![DetectionEdge::Detected]);
    assert_eq!(app.world().get::<Perception>(agent).and_then(|p| p.tracked), Some(target));

    app.world_mut()
        .entity_mut(latecomer)
        .insert(DetectionTarget::default());

    // цель по умолчанию сменилась, но отслеживается прежняя
    run_ticks(&mut app, 300);
    assert_eq!(edges(&app), vec![DetectionEdge::Detected]);
    assert_eq!(
        app.world().get::<DetectionTarget>(target).map(|t| t.detection_count),
        Some(1)
    );

    app.world_mut().send_event(AgentRequest::ForgetTarget { agent });
    run_ticks(&mut app, 2);

    let lost: Vec<_> = app
        .world()
        .resource::<Recorded<DetectionChanged>>()
        .0
        .iter()
        .filter(|event| event.edge == DetectionEdge::Lost)
        .map(|event| event.target)
        .collect();
    assert_eq!(lost, vec![Some(target)]);
    assert_eq!(
        app.world().get::<DetectionTarget>(target).map(|t| t.detection_count),
        Some(0)
    );
    assert_eq!(
        app.world().get::<DetectionTarget>(latecomer).map(|t| t.detection_count),
        Some(0)
    );
}
