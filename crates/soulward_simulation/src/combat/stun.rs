//! Stun — оглушение цели с иммунитетом после окончания

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::count_down;

/// Оглушение
///
/// Иммунитет начинает отсчёт только после окончания оглушения,
/// поэтому stun-lock невозможен.
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct Stun {
    pub immunity_time: f32,
    #[serde(skip)]
    pub remaining: f32,
    #[serde(skip)]
    pub immunity: f32,
}

impl Default for Stun {
    fn default() -> Self {
        Self {
            immunity_time: 0.8,
            remaining: 0.0,
            immunity: 0.0,
        }
    }
}

impl Stun {
    pub fn is_stunned(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn is_immune(&self) -> bool {
        self.immunity > 0.0
    }

    /// false — уже оглушён, иммунитет или длительность не конечна / ≤ 0
    pub fn try_stun(&mut self, duration: f32) -> bool {
        if self.is_stunned() || self.is_immune() || !duration.is_finite() || duration <= 0.0 {
            return false;
        }
        self.remaining = duration;
        true
    }

    pub fn tick(&mut self, dt: f32) {
        if self.is_stunned() {
            if count_down(&mut self.remaining, dt) {
                self.immunity = self.immunity_time;
            }
            return;
        }
        count_down(&mut self.immunity, dt);
    }
}
