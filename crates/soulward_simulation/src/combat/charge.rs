//! ChargeAttack — атака с зарядкой
//!
//! Зарядка стартует когда цель в attack range. Цель должна оставаться
//! внутри radius всё время charge_time, иначе заряд сбрасывается в ноль.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::count_up;

#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct ChargeAttack {
    pub charge_time: f32,
    /// Радиус удержания цели во время зарядки (m)
    pub radius: f32,
    #[serde(skip)]
    pub elapsed: f32,
    #[serde(skip)]
    pub charging: bool,
}

impl Default for ChargeAttack {
    fn default() -> Self {
        Self {
            charge_time: 1.2,
            radius: 3.0,
            elapsed: 0.0,
            charging: false,
        }
    }
}

impl ChargeAttack {
    pub fn start(&mut self) {
        if self.charging {
            return;
        }
        self.charging = true;
        self.elapsed = 0.0;
    }

    /// Тик зарядки. true — заряд готов (зарядка завершена).
    pub fn prepare(&mut self, target_in_radius: bool, dt: f32) -> bool {
        if !self.charging {
            return false;
        }
        if !target_in_radius {
            self.cancel();
            return false;
        }
        if count_up(&mut self.elapsed, dt, self.charge_time) {
            self.charging = false;
            self.elapsed = 0.0;
            return true;
        }
        false
    }

    pub fn cancel(&mut self) {
        self.charging = false;
        self.elapsed = 0.0;
    }

    /// 0..1
    pub fn progress(&self) -> f32 {
        if self.charge_time <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.charge_time).clamp(0.0, 1.0)
    }
}
