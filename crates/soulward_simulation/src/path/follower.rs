//! PathFollower — state machine патрульного маршрута
//!
//! Состояния: Idle (маршрута нет) → OnPath ⇄ Suspended, OnPath → Terminated.
//!
//! Тик (только в OnPath):
//! 1. активное действие (Rest/Look/Scan/Spin/ожидание прыжка/приземления)
//!    исполняется и больше ничего не происходит
//! 2. циклы исчерпаны → successor или Terminated
//! 3. движение к destination; на месте → действие waypoint'а,
//!    переход к следующему (с учётом циклов)

use bevy::prelude::*;

use super::scan::{scan_directions, ScanOrder};
use super::waypoint::{PathConfig, WaypointAction};
use crate::locomotion::{Gait, Motor, RotationStyle};
use crate::shared::count_up;

/// Тело, которым управляет маршрут
pub trait PathAgent {
    fn set_gait(&mut self, gait: Gait);
    /// true — дошёл
    fn move_towards(&mut self, destination: Vec3, walking_plane: bool) -> bool;
    fn face_point(&mut self, point: Vec3);
    /// true — направление достигнуто
    fn turn_towards(&mut self, direction: Vec3, walking_plane: bool) -> bool;
    fn fixed_turn(&mut self, clockwise: bool);
    fn can_jump(&self) -> bool;
    fn jump(&mut self) -> bool;
    fn is_grounded(&self) -> bool;
    fn eye_level(&self) -> Vec3;
    fn forward(&self) -> Vec3;
}

impl PathAgent for Motor<'_> {
    fn set_gait(&mut self, gait: Gait) {
        Motor::set_gait(self, gait);
    }

    fn move_towards(&mut self, destination: Vec3, walking_plane: bool) -> bool {
        Motor::move_towards(self, destination, 0.0, walking_plane, RotationStyle::WalkingPlane)
    }

    fn face_point(&mut self, point: Vec3) {
        self.face_target(point, RotationStyle::WalkingPlane);
    }

    fn turn_towards(&mut self, direction: Vec3, walking_plane: bool) -> bool {
        Motor::turn_towards(self, direction, walking_plane)
    }

    fn fixed_turn(&mut self, clockwise: bool) {
        Motor::fixed_turn(self, clockwise);
    }

    fn can_jump(&self) -> bool {
        Motor::can_jump(self)
    }

    fn jump(&mut self) -> bool {
        Motor::jump(self)
    }

    fn is_grounded(&self) -> bool {
        self.controller.grounded
    }

    fn eye_level(&self) -> Vec3 {
        Motor::eye_level(self)
    }

    fn forward(&self) -> Vec3 {
        Motor::forward(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum PathStatus {
    /// Пустой маршрут — навсегда
    Idle,
    OnPath,
    /// Ушёл с маршрута (погоня/расследование), ждёт resume
    Suspended,
    /// Циклы исчерпаны и successor'а нет — навсегда
    Terminated,
}

/// Неподвижное действие на waypoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathActivity {
    Idle,
    Resting { elapsed: f32 },
    Looking { elapsed: f32 },
    Scanning { directions: [Vec3; 3], index: usize },
    Spinning { elapsed: f32 },
    AwaitingJump,
    AwaitingLand,
}

/// Что произошло за тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathEvent {
    Arrived { index: usize, action: WaypointAction },
    /// Циклы исчерпаны, загружен следующий маршрут
    SwitchedPath,
    Terminated,
}

#[derive(Component, Debug, Clone)]
pub struct PathFollower {
    config: PathConfig,
    status: PathStatus,
    index: usize,
    cycles_complete: u32,
    destination: Vec3,
    imaginary: bool,
    leaping: bool,
    activity: PathActivity,
}

impl PathFollower {
    pub fn new(config: PathConfig) -> Self {
        let mut follower = Self {
            status: if config.is_empty() {
                PathStatus::Idle
            } else {
                PathStatus::OnPath
            },
            config,
            index: 0,
            cycles_complete: 0,
            destination: Vec3::ZERO,
            imaginary: false,
            leaping: false,
            activity: PathActivity::Idle,
        };
        follower.set_destination();
        follower
    }

    // === Queries ===

    pub fn status(&self) -> PathStatus {
        self.status
    }

    pub fn is_on_path(&self) -> bool {
        self.status == PathStatus::OnPath
    }

    pub fn path_exists(&self) -> bool {
        !self.config.is_empty()
    }

    pub fn config(&self) -> &PathConfig {
        &self.config
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cycles_complete(&self) -> u32 {
        self.cycles_complete
    }

    pub fn current_destination(&self) -> Vec3 {
        self.destination
    }

    pub fn current_action(&self) -> Option<WaypointAction> {
        self.config.waypoints.get(self.index).map(|w| w.action)
    }

    pub fn current_gait(&self) -> Gait {
        self.current_action().map(WaypointAction::gait).unwrap_or_default()
    }

    pub fn activity(&self) -> PathActivity {
        self.activity
    }

    pub fn is_resting(&self) -> bool {
        matches!(self.activity, PathActivity::Resting { .. })
    }

    pub fn is_looking(&self) -> bool {
        matches!(self.activity, PathActivity::Looking { .. })
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self.activity, PathActivity::Scanning { .. })
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.activity, PathActivity::Spinning { .. })
    }

    pub fn is_leaping(&self) -> bool {
        self.leaping
    }

    // === Transitions ===

    /// Уйти с маршрута. Активные действия отменяются.
    pub fn exit_path(&mut self) -> bool {
        if self.status != PathStatus::OnPath {
            return false;
        }
        self.status = PathStatus::Suspended;
        self.activity = PathActivity::Idle;
        self.leaping = false;
        true
    }

    /// Вернуться на маршрут с последнего реального waypoint'а
    pub fn resume_path(&mut self) -> bool {
        if self.status != PathStatus::Suspended || !self.path_exists() {
            return false;
        }
        self.find_last_real_destination();
        self.set_destination();
        self.status = PathStatus::OnPath;
        true
    }

    /// Бросить маршрут насовсем (смерть агента)
    pub fn abandon(&mut self) {
        if self.status == PathStatus::Idle {
            return;
        }
        self.status = PathStatus::Terminated;
        self.activity = PathActivity::Idle;
        self.leaping = false;
    }

    pub fn tick(&mut self, agent: &mut impl PathAgent, dt: f32) -> Option<PathEvent> {
        if self.status != PathStatus::OnPath {
            return None;
        }

        if self.perform_activity(agent, dt) {
            return None;
        }

        if self.cycles_exhausted() {
            return Some(self.finish());
        }

        self.travel(agent)
    }

    // === Internals ===

    fn cycles_exhausted(&self) -> bool {
        self.config.max_cycles >= 0 && self.cycles_complete >= self.config.max_cycles as u32
    }

    /// Successor заменяет конфиг целиком, иначе Terminated
    fn finish(&mut self) -> PathEvent {
        match self.config.next.take() {
            Some(next) => {
                crate::logger::log(&format!(
                    "🔁 Path finished after {} cycles, switching to next path ({} waypoints)",
                    self.cycles_complete,
                    next.len()
                ));
                *self = PathFollower::new(*next);
                PathEvent::SwitchedPath
            }
            None => {
                self.status = PathStatus::Terminated;
                self.activity = PathActivity::Idle;
                self.leaping = false;
                PathEvent::Terminated
            }
        }
    }

    fn travel(&mut self, agent: &mut impl PathAgent) -> Option<PathEvent> {
        agent.set_gait(self.current_gait());

        let arrived =
            self.imaginary || agent.move_towards(self.destination, self.config.walking_plane);

        let mut event = None;
        if arrived {
            event = self.current_action().map(|action| PathEvent::Arrived {
                index: self.index,
                action,
            });
            self.on_arrival(agent);
        }

        // один прыжок по дороге к Leap waypoint'у
        if self.leaping && agent.can_jump() {
            agent.jump();
            self.leaping = false;
        }

        event
    }

    fn on_arrival(&mut self, agent: &mut impl PathAgent) {
        self.trigger_action(agent);
        self.advance_index();
        self.set_destination();
    }

    fn trigger_action(&mut self, agent: &mut impl PathAgent) {
        let Some(action) = self.current_action() else {
            return;
        };

        if matches!(action, WaypointAction::Face | WaypointAction::FaceScan) {
            agent.face_point(self.destination);
        }

        self.activity = match action {
            WaypointAction::Rest => PathActivity::Resting { elapsed: 0.0 },
            WaypointAction::Face => PathActivity::Looking { elapsed: 0.0 },
            WaypointAction::Scan | WaypointAction::FaceScan => {
                let order = ScanOrder::new(self.config.scan_left_to_right);
                PathActivity::Scanning {
                    directions: scan_directions(
                        agent.eye_level(),
                        self.destination,
                        agent.forward(),
                        self.config.scan_arc,
                    ),
                    index: order.from,
                }
            }
            WaypointAction::Spin => PathActivity::Spinning { elapsed: 0.0 },
            WaypointAction::Jump => PathActivity::AwaitingJump,
            WaypointAction::Walk | WaypointAction::Run | WaypointAction::Leap => PathActivity::Idle,
        };

        // недопрыгнувший leap отменяется
        self.leaping = false;
    }

    /// true — действие занимало тик
    fn perform_activity(&mut self, agent: &mut impl PathAgent, dt: f32) -> bool {
        let next = match self.activity {
            PathActivity::Idle => return false,
            PathActivity::Resting { mut elapsed } => {
                let done = count_up(&mut elapsed, dt, self.config.rest_time);
                (!done).then_some(PathActivity::Resting { elapsed })
            }
            PathActivity::Looking { mut elapsed } => {
                let done = count_up(&mut elapsed, dt, self.config.look_time);
                (!done).then_some(PathActivity::Looking { elapsed })
            }
            PathActivity::Scanning { directions, index } => {
                let direction = directions.get(index).copied().unwrap_or(Vec3::ZERO);
                if agent.turn_towards(direction, self.config.walking_plane) {
                    ScanOrder::new(self.config.scan_left_to_right)
                        .next(index)
                        .map(|index| PathActivity::Scanning { directions, index })
                } else {
                    Some(self.activity)
                }
            }
            PathActivity::Spinning { mut elapsed } => {
                agent.fixed_turn(self.config.scan_left_to_right);
                let done = count_up(&mut elapsed, dt, self.config.spin_time);
                (!done).then_some(PathActivity::Spinning { elapsed })
            }
            PathActivity::AwaitingJump => {
                if agent.can_jump() && agent.jump() {
                    Some(PathActivity::AwaitingLand)
                } else {
                    Some(PathActivity::AwaitingJump)
                }
            }
            PathActivity::AwaitingLand => {
                (!agent.is_grounded()).then_some(PathActivity::AwaitingLand)
            }
        };

        self.activity = next.unwrap_or(PathActivity::Idle);
        true
    }

    fn advance_index(&mut self) {
        let len = self.config.len();
        if len == 0 {
            return;
        }
        if self.index + 1 >= len {
            self.cycles_complete += 1;
            self.index = 0;
        } else {
            self.index += 1;
        }
    }

    /// Откат назад до первого не-воображаемого waypoint'а (максимум один круг)
    fn find_last_real_destination(&mut self) {
        let len = self.config.len();
        if len == 0 {
            return;
        }

        let start = self.index;
        let mut checks = 0;
        while self.config.waypoints[self.index].action.is_imaginary() {
            self.index = (self.index + len - 1) % len;
            checks += 1;
            if checks >= len {
                self.index = start;
                crate::logger::log_warning(
                    "⚠️ Path has no real waypoints to resume from, keeping current index",
                );
                return;
            }
        }
    }

    fn set_destination(&mut self) {
        let Some(waypoint) = self.config.waypoints.get(self.index).copied() else {
            return;
        };
        self.destination = waypoint.position;
        self.imaginary = waypoint.action.is_imaginary();
        if waypoint.action == WaypointAction::Leap {
            self.leaping = true;
        }
    }
}
