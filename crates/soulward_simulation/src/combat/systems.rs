//! Combat systems (FixedUpdate)

use bevy::prelude::*;

use super::health::{Dead, DespawnAfter, EntityDied, Health, LastAttacker};
use super::stun::Stun;
use crate::locomotion::KinematicController;
use crate::shared::count_down;

/// System: тик оглушения; оглушённый стоит на месте (вертикаль не трогаем — падает)
pub fn tick_stuns(
    mut query: Query<(Entity, &mut Stun, Option<&mut KinematicController>)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut stun, controller) in query.iter_mut() {
        let was_stunned = stun.is_stunned();
        stun.tick(delta);

        if stun.is_stunned() {
            if let Some(mut controller) = controller {
                controller.velocity.x = 0.0;
                controller.velocity.z = 0.0;
            }
        } else if was_stunned {
            crate::logger::log(&format!("💫 {:?} recovered from stun", entity));
        }
    }
}

/// System: урон от void (max / void_time в секунду)
pub fn apply_void_damage(
    mut query: Query<(&KinematicController, &mut Health), Without<Dead>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (controller, mut health) in query.iter_mut() {
        if !controller.in_void {
            continue;
        }
        let damage = health.void_damage(delta);
        health.take_damage(damage);
    }
}

/// System: Health ≤ 0 → Dead + EntityDied (+ DespawnAfter если есть decay)
pub fn detect_deaths(
    mut commands: Commands,
    query: Query<(Entity, &Health, Option<&LastAttacker>), Without<Dead>>,
    mut died_events: EventWriter<EntityDied>,
) {
    for (entity, health, last_attacker) in query.iter() {
        if health.is_alive() {
            continue;
        }

        let killer = last_attacker.map(|attacker| attacker.0);
        let Ok(mut entity_commands) = commands.get_entity(entity) else {
            continue;
        };
        entity_commands.insert(Dead);
        if let Some(decay) = health.decay_time {
            entity_commands.insert(DespawnAfter { remaining: decay });
        }

        died_events.write(EntityDied { entity, killer });
        crate::logger::log_info(&format!("💀 Entity {:?} died (killer: {:?})", entity, killer));
    }
}

/// System: деспавн entities с истёкшим DespawnAfter
pub fn despawn_after_timeout(
    mut commands: Commands,
    mut query: Query<(Entity, &mut DespawnAfter)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut despawn_after) in query.iter_mut() {
        if count_down(&mut despawn_after.remaining, delta) || despawn_after.remaining <= 0.0 {
            crate::logger::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).despawn();
        }
    }
}
