//! Готовые профили (типы врагов)

use super::{AgentProfile, CombatConfig};
use crate::agent::{AgentBehavior, ChaseStyle};
use crate::combat::{ChargeAttack, Knockback, MeleeStrike};
use crate::perception::PerceptionConfig;

/// Стоит на месте, поворачивается к цели, бьёт вблизи
pub fn sentry() -> AgentProfile {
    AgentProfile {
        name: "sentry".to_string(),
        perception: PerceptionConfig {
            fov: 120.0,
            sight_radius: 10.0,
            ..Default::default()
        },
        behavior: AgentBehavior {
            chase: ChaseStyle::Stationary,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Бежит к цели, прыгает если цель выше
pub fn brute() -> AgentProfile {
    AgentProfile {
        name: "brute".to_string(),
        behavior: AgentBehavior {
            chase: ChaseStyle::Direct,
            jump_at_elevated_target: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Заряжает удар по площади, видит цель со всех сторон после обнаружения
pub fn stomper() -> AgentProfile {
    AgentProfile {
        name: "stomper".to_string(),
        perception: PerceptionConfig {
            tracking_fov: Some(360.0),
            tracking_sight_radius: Some(12.0),
            ..Default::default()
        },
        combat: CombatConfig {
            attack_cooldown: 2.5,
            attack_range: 2.0,
            charge: Some(ChargeAttack::default()),
            strike: MeleeStrike {
                damage: 40.0,
                stun: Some(1.0),
                knockback: Some(Knockback {
                    power: 6.0,
                    pitch: -45.0,
                }),
            },
            health: 200.0,
            ..Default::default()
        },
        behavior: AgentBehavior {
            chase: ChaseStyle::Charge { pursue: true },
            obstacle_sensor: Some(1.0),
            attack_on_land: true,
            ..Default::default()
        },
        ..Default::default()
    }
}
