//! Combat timing module
//!
//! ECS ответственность:
//! - Тайминг: AttackTimer (cooldown), ChargeAttack (зарядка), Stun (оглушение + иммунитет)
//! - Состояние: Health, Dead, DespawnAfter
//! - Эффект удара: AttackHook (по умолчанию melee_strike)
//! - Events: DamageDealt, EntityDied
//!
//! AttackTimer / ChargeAttack тикает agent orchestrator в decision tick.

use bevy::prelude::*;

pub mod attack;
pub mod charge;
pub mod health;
pub mod strike;
pub mod stun;
pub mod systems;

#[cfg(test)]
mod systems_tests;

pub use attack::AttackTimer;
pub use charge::ChargeAttack;
pub use health::{DamageDealt, Dead, DespawnAfter, EntityDied, Health, LastAttacker};
pub use strike::{apply_strike, melee_strike, AttackHook, Knockback, MeleeStrike};
pub use stun::Stun;

use crate::SimulationSet;

/// Combat Plugin
///
/// Порядок выполнения:
/// 1. tick_stuns (Act) — оглушённые стоят до физического шага
/// 2. apply_void_damage — урон от падения в void
/// 3. detect_deaths — Dead + EntityDied
/// 4. despawn_after_timeout — уборка тел
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .register_type::<AttackTimer>()
            .register_type::<ChargeAttack>()
            .register_type::<Stun>()
            .register_type::<Health>();

        app.add_systems(FixedUpdate, systems::tick_stuns.in_set(SimulationSet::Act));

        app.add_systems(
            FixedUpdate,
            (
                systems::apply_void_damage,
                systems::detect_deaths,
                systems::despawn_after_timeout,
            )
                .chain()
                .in_set(SimulationSet::Combat),
        );
    }
}
