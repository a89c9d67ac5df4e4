//! Health, смерть и уборка тел

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Здоровье
///
/// Инвариант: 0.0 ≤ current ≤ max
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    /// За сколько секунд void убивает с полного здоровья
    pub void_time: f32,
    /// Задержка деспавна тела; None — тело остаётся
    pub decay_time: Option<f32>,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = if max.is_finite() { max.max(1.0) } else { 100.0 };
        Self {
            current: max,
            max,
            void_time: 2.0,
            decay_time: Some(7.0),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn take_damage(&mut self, amount: f32) {
        if !amount.is_finite() || amount <= 0.0 {
            return;
        }
        self.current = (self.current - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        if !amount.is_finite() || amount <= 0.0 || !self.is_alive() {
            return;
        }
        self.current = (self.current + amount).min(self.max);
    }

    pub fn kill(&mut self) {
        self.current = 0.0;
    }

    /// Урон от void за тик
    pub fn void_damage(&self, dt: f32) -> f32 {
        if self.void_time <= 0.0 {
            return self.max;
        }
        self.max / self.void_time * dt
    }
}

/// Компонент-маркер: entity мертв (Health <= 0)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Dead;

/// Деспавн entity через `remaining` секунд
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct DespawnAfter {
    pub remaining: f32,
}

/// Событие: урон нанесен
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: f32,
    pub target_died: bool,
}

/// Событие: entity умер (health <= 0)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Кто последним нанёс урон (для EntityDied.killer)
#[derive(Component, Debug, Clone, Copy)]
pub struct LastAttacker(pub Entity);
