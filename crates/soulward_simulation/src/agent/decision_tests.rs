//! Tests for agent decision / motion ticks.

use bevy::prelude::*;

use super::components::{AgentBehavior, ChaseStyle, Investigation};
use super::decision::*;
use crate::combat::{AttackTimer, ChargeAttack};
use crate::locomotion::{KinematicController, MovementConfig};
use crate::path::{PathConfig, PathFollower, PathStatus, Waypoint};
use crate::perception::{DetectionEdge, Perception};
use crate::spatial::{EmptySpace, StaticGeometry, SurfaceTag};

const DT: f32 = 1.0 / 60.0;

/// Компоненты одного агента без ECS
struct Rig {
    transform: Transform,
    config: MovementConfig,
    controller: KinematicController,
    perception: Perception,
    path: PathFollower,
    attack: AttackTimer,
    charge: Option<ChargeAttack>,
    behavior: AgentBehavior,
    investigation: Investigation,
}

impl Rig {
    fn new() -> Self {
        let config = MovementConfig::default();
        Self {
            transform: Transform::default(),
            controller: KinematicController {
                grounded: true,
                ..KinematicController::new(&config)
            },
            config,
            perception: Perception::default(),
            path: PathFollower::new(PathConfig::new(vec![
                Waypoint::walk(Vec3::new(5.0, 0.0, 5.0)),
                Waypoint::walk(Vec3::new(-5.0, 0.0, 5.0)),
            ])),
            attack: AttackTimer::default(),
            charge: None,
            behavior: AgentBehavior::default(),
            investigation: Investigation::default(),
        }
    }

    fn parts(&mut self) -> AgentParts<'_> {
        AgentParts {
            entity: Entity::from_raw(1),
            transform: &mut self.transform,
            config: &self.config,
            controller: &mut self.controller,
            perception: &mut self.perception,
            path: &mut self.path,
            attack: &mut self.attack,
            charge: self.charge.as_mut(),
            behavior: &self.behavior,
            investigation: &mut self.investigation,
        }
    }

    /// Цель уже отслеживается и видна
    fn tracking(mut self) -> Self {
        self.perception.detected = true;
        self.perception.visible = true;
        self.path.exit_path();
        self
    }

    fn decide(&mut self, target: Option<&TargetSnapshot>, dead: bool) -> DecisionReport {
        decide(&mut self.parts(), target, &EmptySpace, dead, DT)
    }

    fn act(&mut self, target: Option<&TargetSnapshot>) -> MotionReport {
        act(&mut self.parts(), target, &EmptySpace, false, DT)
    }

    /// Физический шаг вручную: drag + position += velocity * dt
    fn integrate(&mut self) {
        self.controller.apply_drag(&self.config, DT);
        self.transform.translation += self.controller.velocity * DT;
    }
}

fn target_at(position: Vec3) -> TargetSnapshot {
    TargetSnapshot {
        entity: Entity::from_raw(2),
        position,
        eye: position + Vec3::Y * 1.6,
        body: position + Vec3::Y * 0.9,
        safe: false,
    }
}

#[test]
fn test_detect_suspends_path_and_loss_resumes_it() {
    let mut rig = Rig::new();
    let visible = target_at(Vec3::new(0.0, 0.0, -5.0));
    let behind = target_at(Vec3::new(0.0, 0.0, 5.0));

    let report = rig.decide(Some(&visible), false);
    assert_eq!(report.edge, Some(DetectionEdge::Detected));
    assert_eq!(rig.path.status(), PathStatus::Suspended);

    // search_time = 3s → 180 тиков
    for tick in 1..180 {
        let report = rig.decide(Some(&behind), false);
        assert_eq!(report.edge, None, "lost early on tick {}", tick);
    }
    let report = rig.decide(Some(&behind), false);
    assert_eq!(report.edge, Some(DetectionEdge::Lost));
    assert_eq!(rig.path.status(), PathStatus::OnPath);
}

#[test]
fn test_seeing_target_again_resets_search() {
    let mut rig = Rig::new();
    let visible = target_at(Vec3::new(0.0, 0.0, -5.0));
    let behind = target_at(Vec3::new(0.0, 0.0, 5.0));

    rig.decide(Some(&visible), false);
    for _ in 0..170 {
        rig.decide(Some(&behind), false);
    }
    assert_eq!(rig.decide(Some(&visible), false).edge, None);
    for _ in 0..170 {
        assert_eq!(rig.decide(Some(&behind), false).edge, None);
    }
    assert!(rig.perception.detected);
}

#[test]
fn test_safe_target_forgotten_immediately() {
    let mut rig = Rig::new();
    let mut target = target_at(Vec3::new(0.0, 0.0, -5.0));

    rig.decide(Some(&target), false);
    assert!(rig.perception.detected);

    target.safe = true;
    let report = rig.decide(Some(&target), false);
    assert_eq!(report.edge, Some(DetectionEdge::Lost));
    assert!(!rig.perception.visible);

    // в безопасной зоне цель не обнаруживается
    assert_eq!(rig.decide(Some(&target), false).edge, None);
}

#[test]
fn test_attack_on_path_keeps_path_and_loses_immediately() {
    let mut rig = Rig::new();
    rig.behavior.attack_on_path = true;

    rig.decide(Some(&target_at(Vec3::new(0.0, 0.0, -5.0))), false);
    assert!(rig.perception.detected);
    assert!(rig.path.is_on_path());

    let report = rig.decide(Some(&target_at(Vec3::new(0.0, 0.0, 5.0))), false);
    assert_eq!(report.edge, Some(DetectionEdge::Lost));
    assert!(rig.path.is_on_path());
}

#[test]
fn test_occluded_target_not_detected() {
    let mut rig = Rig::new();
    let wall = StaticGeometry::new().with_box(
        Vec3::new(0.0, 1.0, -2.5),
        Vec3::new(3.0, 2.0, 0.2),
        SurfaceTag::Environment,
    );
    let target = target_at(Vec3::new(0.0, 0.0, -5.0));

    let report = decide(&mut rig.parts(), Some(&target), &wall, false, DT);
    assert_eq!(report.edge, None);
    assert!(!rig.perception.visible);
}

#[test]
fn test_dead_agent_forgets_and_freezes() {
    let mut rig = Rig::new();
    let target = target_at(Vec3::new(0.0, 0.0, -5.0));
    rig.decide(Some(&target), false);
    rig.controller.velocity = Vec3::new(2.0, 0.0, 0.0);

    let report = rig.decide(Some(&target), true);
    assert_eq!(report.edge, Some(DetectionEdge::Lost));
    assert_eq!(rig.path.status(), PathStatus::Terminated);
    assert!(rig.controller.frozen);
    assert_eq!(rig.controller.velocity, Vec3::ZERO);

    // мёртвый больше ничего не делает
    assert_eq!(rig.decide(Some(&target), true).edge, None);
    assert_eq!(rig.act(Some(&target)), MotionReport::default());
}

#[test]
fn test_direct_chase_attacks_once_in_range() {
    let mut rig = Rig::new().tracking();
    let target = target_at(Vec3::new(0.0, 0.0, -1.0));

    assert!(rig.act(Some(&target)).attack_fired);
    assert!(!rig.act(Some(&target)).attack_fired);
    assert!(rig.attack.attacking);
}

#[test]
fn test_direct_chase_runs_towards_target() {
    let mut rig = Rig::new().tracking();
    let target = target_at(Vec3::new(0.0, 0.0, -6.0));

    let report = rig.act(Some(&target));
    assert!(!report.attack_fired);
    assert!(rig.controller.velocity.z < 0.0);
    assert!(rig.controller.is_running(&rig.config));
}

#[test]
fn test_staggered_agent_does_not_move() {
    let mut rig = Rig::new().tracking();
    rig.controller.stagger(&rig.config);
    let target = target_at(Vec3::new(0.0, 0.0, -6.0));

    assert_eq!(rig.act(Some(&target)), MotionReport::default());
    assert_eq!(rig.controller.velocity, Vec3::ZERO);
}

#[test]
fn test_stationary_faces_but_stays() {
    let mut rig = Rig::new().tracking();
    rig.behavior.chase = ChaseStyle::Stationary;
    let target = target_at(Vec3::new(4.0, 0.0, 0.0));

    let report = rig.act(Some(&target));
    assert!(!report.attack_fired);
    assert_eq!(rig.controller.velocity, Vec3::ZERO);
    assert!(rig.transform.forward().x > 0.99);

    let close = target_at(Vec3::new(1.0, 0.0, 0.0));
    assert!(rig.act(Some(&close)).attack_fired);
}

#[test]
fn test_stationary_holds_fire_while_target_hidden() {
    let mut rig = Rig::new().tracking();
    rig.behavior.chase = ChaseStyle::Stationary;
    let wall = StaticGeometry::new().with_box(
        Vec3::new(0.0, 1.0, -0.6),
        Vec3::new(2.0, 2.0, 0.05),
        SurfaceTag::Environment,
    );
    let target = target_at(Vec3::new(0.0, 0.0, -1.0));

    // цель за стеной: ещё отслеживается (grace), но не видна
    let report = decide(&mut rig.parts(), Some(&target), &wall, false, DT);
    assert_eq!(report.edge, None);
    assert!(rig.perception.detected);
    assert!(!rig.perception.visible);
    assert!(!rig.act(Some(&target)).attack_fired);
    assert!(!rig.attack.attacking);

    // стена убрана — удар
    rig.decide(Some(&target), false);
    assert!(rig.perception.visible);
    assert!(rig.act(Some(&target)).attack_fired);
}

#[test]
fn test_stationary_range_is_measured_in_3d() {
    let mut rig = Rig::new().tracking();
    rig.behavior.chase = ChaseStyle::Stationary;

    // по горизонтали рядом, но на 3 м выше
    let above = target_at(Vec3::new(0.5, 3.0, 0.0));
    assert!(!rig.act(Some(&above)).attack_fired);
}

#[test]
fn test_charge_fires_after_charge_time() {
    let mut rig = Rig::new().tracking();
    rig.behavior.chase = ChaseStyle::Charge { pursue: false };
    rig.charge = Some(ChargeAttack::default());
    let target = target_at(Vec3::new(0.0, 0.0, -1.0));

    // первый тик — начало зарядки
    assert!(!rig.act(Some(&target)).attack_fired);
    assert!(rig.charge.as_ref().is_some_and(|c| c.charging));

    let mut fired_on = None;
    for tick in 1..=80 {
        if rig.act(Some(&target)).attack_fired {
            fired_on = Some(tick);
            break;
        }
    }
    // charge_time = 1.2s → 72 тика
    assert_eq!(fired_on, Some(72));
}

#[test]
fn test_charge_cancelled_when_target_leaves_radius() {
    let mut rig = Rig::new().tracking();
    rig.behavior.chase = ChaseStyle::Charge { pursue: false };
    rig.charge = Some(ChargeAttack::default());

    rig.act(Some(&target_at(Vec3::new(0.0, 0.0, -1.0))));
    for _ in 0..30 {
        rig.act(Some(&target_at(Vec3::new(0.0, 0.0, -1.0))));
    }

    let report = rig.act(Some(&target_at(Vec3::new(0.0, 0.0, -5.0))));
    assert!(!report.attack_fired);
    let charge = rig.charge.as_ref().map(|c| (c.charging, c.elapsed));
    assert_eq!(charge, Some((false, 0.0)));
}

#[test]
fn test_charge_loss_cancels_charging() {
    let mut rig = Rig::new();
    rig.behavior.chase = ChaseStyle::Charge { pursue: true };
    rig.charge = Some(ChargeAttack::default());
    let target = target_at(Vec3::new(0.0, 0.0, -1.0));

    rig.decide(Some(&target), false);
    rig.act(Some(&target));
    assert!(rig.parts().is_charging());

    // ForgetTarget
    let edge = rig.perception.forget();
    assert_eq!(edge, Some(DetectionEdge::Lost));
    handle_edge(&mut rig.parts(), DetectionEdge::Lost);
    assert!(!rig.parts().is_charging());
    assert!(rig.path.is_on_path());
}

#[test]
fn test_jump_at_elevated_target() {
    let mut rig = Rig::new().tracking();
    rig.behavior.jump_at_elevated_target = true;
    let target = target_at(Vec3::new(0.0, 5.0, -0.5));

    let report = rig.act(Some(&target));
    assert!(report.jumped);
    assert!(rig.controller.jumping);
    assert!(rig.controller.velocity.y > 0.0);
}

#[test]
fn test_investigation_walk_observe_resume() {
    let mut rig = Rig::new();
    let scene = Vec3::new(0.0, 0.0, -8.0);

    assert!(start_investigation(&mut rig.parts(), scene, 2.0, false));
    assert_eq!(rig.path.status(), PathStatus::Suspended);

    let mut finished = false;
    for _ in 0..900 {
        rig.decide(None, false);
        let report = rig.act(None);
        rig.integrate();
        if report.investigation_finished {
            finished = true;
            break;
        }
    }

    assert!(finished);
    assert!(!rig.investigation.active);
    assert!(rig.path.is_on_path());
    // дошли до радиуса осмотра
    let flat = Vec3::new(rig.transform.translation.x, 0.0, rig.transform.translation.z);
    assert!(flat.distance(scene) <= 2.5);
}

#[test]
fn test_investigation_refused_while_tracking() {
    let mut rig = Rig::new().tracking();
    assert!(!start_investigation(
        &mut rig.parts(),
        Vec3::new(3.0, 0.0, 0.0),
        2.0,
        false
    ));
    assert!(!rig.investigation.active);
}

#[test]
fn test_investigate_from_distance_faces_location() {
    let mut rig = Rig::new();
    let location = Vec3::new(10.0, 0.0, 0.0);

    assert!(start_investigation(&mut rig.parts(), location, 2.0, true));
    assert!(rig.investigation.arrived);
    assert!(rig.transform.forward().x > 0.99);

    // observation_time = 2s, агент стоит на месте
    for _ in 0..120 {
        rig.act(None);
    }
    assert!(!rig.investigation.active);
    assert!(rig.transform.translation.length() < 1e-4);
}

#[test]
fn test_detection_cancels_investigation() {
    let mut rig = Rig::new();
    start_investigation(&mut rig.parts(), Vec3::new(0.0, 0.0, -6.0), 2.0, false);

    let report = rig.decide(Some(&target_at(Vec3::new(0.0, 0.0, -4.0))), false);
    assert_eq!(report.edge, Some(DetectionEdge::Detected));
    assert!(!rig.investigation.active);
    assert_eq!(rig.path.status(), PathStatus::Suspended);
}

#[test]
fn test_obstacle_sensor_jumps_at_wall() {
    let mut rig = Rig::new();
    rig.path.exit_path();
    rig.behavior.obstacle_sensor = Some(2.0);
    rig.controller.velocity = Vec3::new(0.0, 0.0, -3.0);

    let wall = StaticGeometry::new().with_box(
        Vec3::new(0.0, 1.0, -1.5),
        Vec3::new(2.0, 2.0, 0.25),
        SurfaceTag::Environment,
    );

    let report = act(&mut rig.parts(), None, &wall, false, DT);
    assert!(report.jumped);
    assert!(rig.controller.jumping);
}

#[test]
fn test_obstacle_sensor_ignores_floor() {
    let mut rig = Rig::new();
    rig.path.exit_path();
    rig.behavior.obstacle_sensor = Some(2.0);
    rig.controller.velocity = Vec3::new(0.0, 0.0, -3.0);

    let floor = StaticGeometry::new().with_floor(0.0, 20.0, SurfaceTag::Environment);

    let report = act(&mut rig.parts(), None, &floor, false, DT);
    assert!(!report.jumped);
}
