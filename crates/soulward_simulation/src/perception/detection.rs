//! Perception — зрение агента и латч обнаружения
//!
//! Видимость считается заново каждый тик, а обнаружение — edge-triggered:
//! события Detected/Lost генерируются только при смене состояния.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::count_up;

/// Смена состояния обнаружения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum DetectionEdge {
    Detected,
    Lost,
}

/// Настройки зрения (часть профиля агента)
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Угол обзора (deg, полный конус)
    pub fov: f32,
    /// Дальность (m)
    pub sight_radius: f32,
    /// Расширенный обзор пока цель отслеживается
    pub tracking_fov: Option<f32>,
    pub tracking_sight_radius: Option<f32>,
    /// Через сколько секунд невидимости цель теряется
    pub search_time: f32,
    /// Цилиндр вместо конуса (игнорировать высоту)
    pub ignore_vertical: bool,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            fov: 90.0,
            sight_radius: 8.0,
            tracking_fov: None,
            tracking_sight_radius: None,
            search_time: 3.0,
            ignore_vertical: true,
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Perception {
    pub config: PerceptionConfig,
    /// Текущий обзор (расширяется при отслеживании)
    pub fov: f32,
    pub sight_radius: f32,
    /// Видна ли цель в этом тике
    pub visible: bool,
    /// Латч: цель обнаружена (tracking)
    pub detected: bool,
    /// Сколько цель не видна при активном отслеживании
    pub search_timer: f32,
    /// Цель, закреплённая на Detected; снимается на Lost
    pub tracked: Option<Entity>,
}

impl Default for Perception {
    fn default() -> Self {
        Self::new(PerceptionConfig::default())
    }
}

impl Perception {
    pub fn new(config: PerceptionConfig) -> Self {
        Self {
            fov: config.fov,
            sight_radius: config.sight_radius,
            config,
            visible: false,
            detected: false,
            search_timer: 0.0,
            tracked: None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.detected
    }

    /// Обработать видимость за тик.
    ///
    /// - видна и не была обнаружена → Detected
    /// - видна и уже обнаружена → сброс search_timer, без события
    /// - не видна при отслеживании → копим время; Lost при
    ///   `immediate_loss` (атака с маршрута) или по истечении search_time
    pub fn update(&mut self, visible: bool, dt: f32, immediate_loss: bool) -> Option<DetectionEdge> {
        self.visible = visible;

        if visible {
            self.search_timer = 0.0;
            if self.detected {
                return None;
            }
            self.detected = true;
            self.widen();
            return Some(DetectionEdge::Detected);
        }

        if !self.detected {
            return None;
        }

        if immediate_loss || count_up(&mut self.search_timer, dt, self.config.search_time) {
            self.detected = false;
            self.search_timer = 0.0;
            self.restore();
            return Some(DetectionEdge::Lost);
        }
        None
    }

    /// Принудительно обнаружить цель (FindTarget)
    pub fn force_detect(&mut self) -> Option<DetectionEdge> {
        self.update(true, 0.0, false)
    }

    /// Мгновенно забыть цель (ForgetTarget, смерть, безопасная зона)
    pub fn forget(&mut self) -> Option<DetectionEdge> {
        self.update(false, 0.0, true)
    }

    /// Закрепить цель за edge.
    ///
    /// Detected → `candidate` становится отслеживаемой целью.
    /// Lost → возвращает закреплённую цель (или `candidate`, если её не было) и снимает её.
    pub fn latch_target(&mut self, edge: DetectionEdge, candidate: Option<Entity>) -> Option<Entity> {
        match edge {
            DetectionEdge::Detected => {
                self.tracked = candidate;
                candidate
            }
            DetectionEdge::Lost => self.tracked.take().or(candidate),
        }
    }

    fn widen(&mut self) {
        if let Some(fov) = self.config.tracking_fov {
            self.fov = fov;
        }
        if let Some(radius) = self.config.tracking_sight_radius {
            self.sight_radius = radius;
        }
    }

    fn restore(&mut self) {
        self.fov = self.config.fov;
        self.sight_radius = self.config.sight_radius;
    }
}
