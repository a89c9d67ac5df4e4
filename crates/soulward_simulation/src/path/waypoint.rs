//! Waypoint и конфигурация маршрута

use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::locomotion::Gait;

/// Действие на waypoint
///
/// Face / FaceScan / Spin — "воображаемые": точка задаёт только направление,
/// агент туда не идёт.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum WaypointAction {
    #[default]
    Walk,
    Run,
    /// Постоять rest_time
    Rest,
    /// Осмотреться по дуге scan_arc
    Scan,
    /// Прыжок на месте, ждать приземления
    Jump,
    /// Бегом и с прыжком по дороге
    Leap,
    /// Повернуться к точке и смотреть look_time
    Face,
    FaceScan,
    /// Вращение на месте spin_time
    Spin,
}

impl WaypointAction {
    pub fn is_imaginary(self) -> bool {
        matches!(
            self,
            WaypointAction::Face | WaypointAction::FaceScan | WaypointAction::Spin
        )
    }

    pub fn gait(self) -> Gait {
        match self {
            WaypointAction::Run | WaypointAction::Leap => Gait::Run,
            _ => Gait::Walk,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Vec3,
    #[serde(default)]
    pub action: WaypointAction,
}

impl Waypoint {
    pub fn new(position: Vec3, action: WaypointAction) -> Self {
        Self { position, action }
    }

    pub fn walk(position: Vec3) -> Self {
        Self::new(position, WaypointAction::Walk)
    }
}

/// Конфигурация маршрута
///
/// Массив waypoint'ов разделяемый (`Arc`): несколько агентов могут ходить
/// по одному маршруту. При завершении маршрута владение конфигом переходит
/// к successor'у (`next`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub waypoints: Arc<[Waypoint]>,
    /// Игнорировать высоту при движении/поворотах
    pub walking_plane: bool,
    /// Отрицательное — бесконечно
    pub max_cycles: i32,
    pub rest_time: f32,
    pub look_time: f32,
    pub spin_time: f32,
    /// Дуга осмотра (deg)
    pub scan_arc: f32,
    pub scan_left_to_right: bool,
    /// Маршрут после исчерпания циклов
    pub next: Option<Box<PathConfig>>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            waypoints: Arc::from(Vec::new()),
            walking_plane: true,
            max_cycles: -1,
            rest_time: 5.0,
            look_time: 2.0,
            spin_time: 3.0,
            scan_arc: 90.0,
            scan_left_to_right: true,
            next: None,
        }
    }
}

impl PathConfig {
    pub fn new(waypoints: impl Into<Arc<[Waypoint]>>) -> Self {
        Self {
            waypoints: waypoints.into(),
            ..default()
        }
    }

    pub fn with_max_cycles(mut self, max_cycles: i32) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn then(mut self, next: PathConfig) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }
}
