//! Melee strike — стандартный attack hook
//!
//! Hook вызывается из decision tick, где нет доступа к компонентам цели,
//! поэтому эффект удара откладывается в command queue и применяется к World.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::health::{DamageDealt, Dead, Health, LastAttacker};
use super::stun::Stun;
use crate::locomotion::{knockback_vector, KinematicController, MovementConfig};

/// Attack hook: (commands, атакующий, цель)
pub type AttackHook = Box<dyn Fn(&mut Commands, Entity, Entity) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knockback {
    pub power: f32,
    /// Наклон (deg); отрицательный — вверх
    pub pitch: f32,
}

/// Параметры ближнего удара
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeStrike {
    pub damage: f32,
    /// Длительность оглушения цели
    pub stun: Option<f32>,
    pub knockback: Option<Knockback>,
}

impl Default for MeleeStrike {
    fn default() -> Self {
        Self {
            damage: 25.0,
            stun: None,
            knockback: Some(Knockback {
                power: 4.0,
                pitch: -30.0,
            }),
        }
    }
}

/// Hook с ближним ударом
pub fn melee_strike(strike: MeleeStrike) -> AttackHook {
    Box::new(move |commands: &mut Commands, attacker: Entity, target: Entity| {
        commands.queue(move |world: &mut World| {
            apply_strike(world, attacker, target, strike);
        });
    })
}

/// Применить удар к цели: урон → оглушение → отбрасывание
pub fn apply_strike(world: &mut World, attacker: Entity, target: Entity, strike: MeleeStrike) {
    let attacker_transform = world.get::<Transform>(attacker).copied();

    let Ok(mut entity) = world.get_entity_mut(target) else {
        crate::logger::log_warning(&format!("⚠️ Strike target {:?} no longer exists", target));
        return;
    };
    if entity.contains::<Dead>() {
        return;
    }

    let mut report = None;
    if let Some(mut health) = entity.get_mut::<Health>() {
        let was_alive = health.is_alive();
        health.take_damage(strike.damage);
        report = Some(DamageDealt {
            attacker: Some(attacker),
            target,
            damage: strike.damage,
            target_died: was_alive && !health.is_alive(),
        });
    }

    if let Some(duration) = strike.stun {
        if let Some(mut stun) = entity.get_mut::<Stun>() {
            if stun.try_stun(duration) {
                crate::logger::log(&format!("💫 {:?} stunned for {:.1}s", target, duration));
            }
        }
    }

    if let (Some(knockback), Some(attacker_transform)) = (strike.knockback, attacker_transform) {
        let config = entity.get::<MovementConfig>().cloned();
        if let (Some(config), Some(mut controller)) =
            (config, entity.get_mut::<KinematicController>())
        {
            let force = knockback_vector(&attacker_transform, knockback.power, knockback.pitch);
            controller.apply_knockback(force, &config);
        }
    }

    entity.insert(LastAttacker(attacker));

    if let Some(report) = report {
        crate::logger::log(&format!(
            "⚔️ {:?} hit {:?} for {:.0} damage{}",
            attacker,
            target,
            report.damage,
            if report.target_died { " (fatal)" } else { "" }
        ));
        world.send_event(report);
    }
}
