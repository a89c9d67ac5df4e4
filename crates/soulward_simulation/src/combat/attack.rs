//! AttackTimer — cooldown атаки агента
//!
//! Сам удар (урон, эффекты) делает hook; здесь только тайминг.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::count_down;

/// Тайминг атаки
///
/// Инвариант: `attacking == true` ровно с момента атаки до тика,
/// на котором cooldown дошёл до нуля.
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct AttackTimer {
    /// Cooldown между атаками (секунды)
    pub cooldown: f32,
    /// Дистанция атаки (m)
    pub range: f32,
    #[serde(skip)]
    pub remaining: f32,
    #[serde(skip)]
    pub attacking: bool,
}

impl Default for AttackTimer {
    fn default() -> Self {
        Self {
            cooldown: 1.5,
            range: 1.2,
            remaining: 0.0,
            attacking: false,
        }
    }
}

impl AttackTimer {
    pub fn new(cooldown: f32, range: f32) -> Self {
        Self {
            cooldown: cooldown.max(0.0),
            range: range.max(0.0),
            ..default()
        }
    }

    pub fn can_attack(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Начать атаку. false — cooldown ещё идёт, ничего не изменилось.
    pub fn try_attack(&mut self) -> bool {
        if !self.can_attack() {
            return false;
        }
        self.remaining = self.cooldown;
        // нулевой cooldown — атака мгновенная
        self.attacking = self.remaining > 0.0;
        true
    }

    /// Атака с hook'ом: hook вызывается ровно один раз при успехе
    pub fn attack_with(&mut self, hook: impl FnOnce()) -> bool {
        if !self.try_attack() {
            return false;
        }
        hook();
        true
    }

    pub fn tick(&mut self, dt: f32) {
        if count_down(&mut self.remaining, dt) {
            self.attacking = false;
        }
    }

    pub fn reset(&mut self) {
        self.remaining = 0.0;
        self.attacking = false;
    }
}
