//! Decision / motion tick агента
//!
//! Чистые функции поверх компонентов (без Query), чтобы логику можно было
//! гонять в unit тестах.
//!
//! decide (Update, decision tick):
//! 1. мёртв → забыть цель, бросить маршрут, стоп
//! 2. безопасная цель → забыть; иначе восприятие → edge → реакция
//! 3. таймеры (jump / stagger / attack)
//!
//! act (FixedUpdate): ровно одно поведение —
//! погоня (или атака с маршрута) / расследование / маршрут.

use bevy::prelude::*;

use super::components::{AgentBehavior, ChaseStyle, Investigation};
use crate::combat::{AttackTimer, ChargeAttack};
use crate::locomotion::{Gait, KinematicController, Motor, MovementConfig, RotationStyle};
use crate::path::{PathEvent, PathFollower};
use crate::perception::{DetectionEdge, Perception, SightTarget, Viewpoint};
use crate::shared::{count_up, flatten, is_mostly_horizontal, is_mostly_vertical};
use crate::spatial::SpatialQuery;

/// Наклон луча-сенсора вниз относительно forward
const SENSOR_DROP: f32 = 0.6;
/// Порог |cos| нормали для "стены"
const WALL_NORMAL_THRESHOLD: f32 = 0.3;

/// Всё состояние одного агента на время тика
pub struct AgentParts<'a> {
    pub entity: Entity,
    pub transform: &'a mut Transform,
    pub config: &'a MovementConfig,
    pub controller: &'a mut KinematicController,
    pub perception: &'a mut Perception,
    pub path: &'a mut PathFollower,
    pub attack: &'a mut AttackTimer,
    pub charge: Option<&'a mut ChargeAttack>,
    pub behavior: &'a AgentBehavior,
    pub investigation: &'a mut Investigation,
}

impl AgentParts<'_> {
    pub fn viewpoint(&self) -> Viewpoint {
        Viewpoint {
            position: self.transform.translation,
            eye: self.config.eye_point(self.transform),
            forward: *self.transform.forward(),
        }
    }

    pub fn body(&self) -> Vec3 {
        self.config.body_point(self.transform)
    }

    pub fn is_charging(&self) -> bool {
        self.charge.as_ref().is_some_and(|charge| charge.charging)
    }
}

/// Цель глазами агента на этот тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSnapshot {
    pub entity: Entity,
    /// Ступни
    pub position: Vec3,
    pub eye: Vec3,
    pub body: Vec3,
    pub safe: bool,
}

impl TargetSnapshot {
    pub fn sight(&self) -> SightTarget {
        SightTarget {
            position: self.position,
            eye: self.eye,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecisionReport {
    pub edge: Option<DetectionEdge>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionReport {
    pub attack_fired: bool,
    pub path_event: Option<PathEvent>,
    pub jumped: bool,
    pub investigation_finished: bool,
}

/// Decision tick
pub fn decide(
    parts: &mut AgentParts,
    target: Option<&TargetSnapshot>,
    spatial: &dyn SpatialQuery,
    dead: bool,
    dt: f32,
) -> DecisionReport {
    if dead {
        return DecisionReport {
            edge: shut_down(parts),
        };
    }

    let edge = match target {
        // в безопасной зоне цель невидима и забывается сразу
        Some(target) if target.safe => parts.perception.forget(),
        Some(target) => {
            let visible = parts
                .perception
                .can_see_target(&parts.viewpoint(), &target.sight(), spatial);
            parts
                .perception
                .update(visible, dt, parts.behavior.attack_on_path)
        }
        None => parts
            .perception
            .update(false, dt, parts.behavior.attack_on_path),
    };

    if let Some(edge) = edge {
        handle_edge(parts, edge);
    }

    parts.controller.cool_down(dt);
    parts.attack.tick(dt);

    DecisionReport { edge }
}

/// Реакция на смену обнаружения
pub fn handle_edge(parts: &mut AgentParts, edge: DetectionEdge) {
    match edge {
        DetectionEdge::Detected => {
            if !parts.behavior.attack_on_path {
                parts.path.exit_path();
            }
            parts.investigation.cancel();
        }
        DetectionEdge::Lost => {
            if !parts.behavior.attack_on_path {
                parts.path.resume_path();
            }
            if let Some(charge) = parts.charge.as_deref_mut() {
                charge.cancel();
            }
        }
    }
}

/// Смерть: цель забыта, маршрут брошен, тело заморожено
fn shut_down(parts: &mut AgentParts) -> Option<DetectionEdge> {
    let edge = parts.perception.forget();
    parts.path.abandon();
    parts.investigation.cancel();
    if let Some(charge) = parts.charge.as_deref_mut() {
        charge.cancel();
    }
    parts.controller.velocity = Vec3::ZERO;
    parts.controller.frozen = true;
    edge
}

/// Начать расследование. false — агент занят целью или стоит на маршруте-атаке.
pub fn start_investigation(
    parts: &mut AgentParts,
    location: Vec3,
    radius: f32,
    from_distance: bool,
) -> bool {
    if parts.perception.detected || parts.behavior.attack_on_path || parts.controller.frozen {
        return false;
    }

    parts.path.exit_path();
    *parts.investigation = Investigation {
        active: true,
        scene: location,
        radius: radius.max(parts.config.distance_error),
        arrived: from_distance,
        elapsed: 0.0,
    };

    if from_distance {
        let mut motor = Motor::new(parts.controller, parts.transform, parts.config, 0.0);
        motor.face_target(location, RotationStyle::WalkingPlane);
    }
    true
}

/// Закончить расследование; маршрут продолжается если цели нет
pub fn finish_investigation(parts: &mut AgentParts) {
    if !parts.investigation.active {
        return;
    }
    parts.investigation.cancel();
    if !parts.perception.detected {
        parts.path.resume_path();
    }
}

/// Motion tick
pub fn act(
    parts: &mut AgentParts,
    target: Option<&TargetSnapshot>,
    spatial: &dyn SpatialQuery,
    dead: bool,
    dt: f32,
) -> MotionReport {
    let mut report = MotionReport::default();
    if dead || parts.controller.frozen || parts.controller.is_flinching() {
        return report;
    }

    match (parts.perception.detected, target) {
        (true, Some(target)) if !parts.behavior.attack_on_path => {
            chase(parts, target, dt, &mut report);
        }
        (true, Some(target)) => {
            report.attack_fired = path_attack(parts, target);
            tick_path(parts, dt, &mut report);
        }
        _ if parts.investigation.active => {
            report.investigation_finished = investigate(parts, dt);
        }
        _ => tick_path(parts, dt, &mut report),
    }

    if sense_obstacle(parts, spatial) {
        report.jumped = true;
    }
    report
}

fn tick_path(parts: &mut AgentParts, dt: f32, report: &mut MotionReport) {
    if !parts.path.is_on_path() {
        return;
    }
    let mut motor = Motor::new(parts.controller, parts.transform, parts.config, dt);
    report.path_event = parts.path.tick(&mut motor, dt);
}

fn chase(parts: &mut AgentParts, target: &TargetSnapshot, dt: f32, report: &mut MotionReport) {
    match parts.behavior.chase {
        ChaseStyle::Direct => chase_direct(parts, target, dt, report),
        ChaseStyle::Stationary => {
            let mut motor = Motor::new(parts.controller, parts.transform, parts.config, dt);
            motor.face_target(target.position, RotationStyle::WalkingPlane);
            // бьёт только видимую цель, как и при прямой погоне
            let in_range = parts.body().distance(target.body) <= parts.attack.range;
            if in_range && parts.perception.visible {
                report.attack_fired = parts.attack.try_attack();
            }
        }
        ChaseStyle::Charge { pursue } => {
            if parts.charge.is_none() {
                chase_direct(parts, target, dt, report);
                return;
            }
            chase_charge(parts, target, pursue, dt, report);
        }
    }
}

fn chase_direct(parts: &mut AgentParts, target: &TargetSnapshot, dt: f32, report: &mut MotionReport) {
    let range = parts.attack.range;
    let in_range = parts.body().distance(target.body) <= range;
    let visible = parts.perception.visible;

    let mut motor = Motor::new(parts.controller, parts.transform, parts.config, dt);
    motor.set_gait(Gait::Run);

    if in_range && visible {
        motor.face_target(target.position, RotationStyle::WalkingPlane);
        report.attack_fired = parts.attack.try_attack();
        return;
    }

    motor.move_towards(target.body, range * 0.8, true, RotationStyle::WalkingPlane);

    if parts.behavior.jump_at_elevated_target {
        let to_target = target.body - motor.body_position();
        if to_target.y > 0.0
            && is_mostly_vertical(to_target, parts.behavior.elevation_threshold)
            && motor.can_jump()
        {
            report.jumped = motor.jump();
        }
    }
}

fn chase_charge(
    parts: &mut AgentParts,
    target: &TargetSnapshot,
    pursue: bool,
    dt: f32,
    report: &mut MotionReport,
) {
    let range = parts.attack.range;
    let cooldown_ready = parts.attack.can_attack();

    let mut motor = Motor::new(parts.controller, parts.transform, parts.config, dt);
    let Some(charge) = parts.charge.as_deref_mut() else {
        return;
    };

    if !charge.charging {
        if motor.close_to(target.body, range, false) && cooldown_ready {
            motor.face_target(target.position, RotationStyle::WalkingPlane);
            charge.start();
        } else if pursue {
            motor.set_gait(Gait::Run);
            motor.move_towards(target.body, range * 0.8, true, RotationStyle::WalkingPlane);
        } else {
            motor.face_target(target.position, RotationStyle::WalkingPlane);
        }
        return;
    }

    motor.face_target(target.position, RotationStyle::WalkingPlane);
    let in_radius = motor.close_to(target.body, charge.radius, false);
    if charge.prepare(in_radius, dt) {
        report.attack_fired = parts.attack.try_attack();
    }
}

/// Атака без схода с маршрута (цель в горизонтальном радиусе)
fn path_attack(parts: &mut AgentParts, target: &TargetSnapshot) -> bool {
    if !parts.perception.visible {
        return false;
    }
    if flatten(target.body - parts.body()).length() > parts.attack.range {
        return false;
    }
    parts.attack.try_attack()
}

/// true — расследование закончено в этом тике
fn investigate(parts: &mut AgentParts, dt: f32) -> bool {
    let scene = parts.investigation.scene;

    if !parts.investigation.arrived {
        let mut motor = Motor::new(parts.controller, parts.transform, parts.config, dt);
        motor.set_gait(Gait::Walk);
        if motor.move_towards(scene, parts.investigation.radius, true, RotationStyle::WalkingPlane) {
            parts.investigation.arrived = true;
            parts.investigation.elapsed = 0.0;
        }
        return false;
    }

    if count_up(
        &mut parts.investigation.elapsed,
        dt,
        parts.behavior.observation_time,
    ) {
        finish_investigation(parts);
        return true;
    }
    false
}

/// Стена впереди-внизу → прыжок
fn sense_obstacle(parts: &mut AgentParts, spatial: &dyn SpatialQuery) -> bool {
    let Some(range) = parts.behavior.obstacle_sensor else {
        return false;
    };
    if !parts.controller.can_jump() || parts.controller.horizontal_speed() < 0.1 {
        return false;
    }

    let forward = *parts.transform.forward();
    let Ok(direction) = Dir3::new(forward + Vec3::NEG_Y * SENSOR_DROP) else {
        return false;
    };

    let Some(hit) = spatial.cast_ray(parts.body(), direction, range) else {
        return false;
    };
    if !is_mostly_horizontal(hit.normal, WALL_NORMAL_THRESHOLD) {
        return false;
    }
    parts.controller.jump(parts.config)
}
