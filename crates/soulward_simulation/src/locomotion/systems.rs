//! Физический шаг (FixedUpdate)
//!
//! Порядок (см. LocomotionPlugin):
//! 1. tick_character_timers — jump/stagger таймеры у персонажей без ExternalClock
//! 2. check_world_limits — void
//! 3. apply_drag
//! 4. apply_gravity
//! 5. integrate_velocity — position += velocity * dt
//! 6. detect_ground — земля, снап, пассажиры платформ
//! 7. land_characters — AgentLanded

use bevy::prelude::*;

use super::controller::{ExternalClock, KinematicController, MovementConfig};
use super::passengers::PlatformPassengers;
use crate::spatial::SceneQuery;

/// Событие: персонаж приземлился после прыжка
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentLanded {
    pub entity: Entity,
}

pub fn tick_character_timers(
    mut query: Query<&mut KinematicController, Without<ExternalClock>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for mut controller in query.iter_mut() {
        controller.cool_down(delta);
    }
}

pub fn check_world_limits(
    mut query: Query<(Entity, &Transform, &MovementConfig, &mut KinematicController)>,
) {
    for (entity, transform, config, mut controller) in query.iter_mut() {
        if controller.frozen {
            continue;
        }
        let was_in_void = controller.in_void;
        if controller.check_world_limits(transform.translation.y, config) && !was_in_void {
            crate::logger::log_warning(&format!(
                "🕳️ {:?} fell into the void at y={:.1}",
                entity, transform.translation.y
            ));
        }
    }
}

pub fn apply_drag(
    mut query: Query<(&MovementConfig, &mut KinematicController)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (config, mut controller) in query.iter_mut() {
        if controller.frozen {
            continue;
        }
        controller.apply_drag(config, delta);
    }
}

/// Гравитация только в воздухе и выше fall_limit
pub fn apply_gravity(
    mut query: Query<(&Transform, &MovementConfig, &mut KinematicController)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (transform, config, mut controller) in query.iter_mut() {
        if controller.frozen {
            continue;
        }
        controller.apply_gravity(transform.translation.y, config, delta);
    }
}

pub fn integrate_velocity(
    mut query: Query<(&KinematicController, &mut Transform)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (controller, mut transform) in query.iter_mut() {
        if controller.frozen {
            continue;
        }
        transform.translation += controller.velocity * delta;
    }
}

/// Ground detection через SceneQuery + учёт пассажиров платформ
pub fn detect_ground(
    scene: SceneQuery,
    mut characters: Query<(Entity, &mut Transform, &MovementConfig, &mut KinematicController)>,
    mut platforms: Query<&mut PlatformPassengers>,
) {
    for (entity, mut transform, config, mut controller) in characters.iter_mut() {
        if controller.frozen || controller.levitates {
            continue;
        }

        let Some(change) = controller.detect_ground(&mut transform, config, &scene) else {
            continue;
        };

        if let Some(old) = change.left {
            if let Ok(mut passengers) = platforms.get_mut(old) {
                passengers.remove(entity);
            }
        }
        if let Some(new) = change.entered {
            if let Ok(mut passengers) = platforms.get_mut(new) {
                passengers.add(entity);
            }
        }
    }
}

pub fn land_characters(
    mut query: Query<(Entity, &mut KinematicController)>,
    mut landed_events: EventWriter<AgentLanded>,
) {
    for (entity, mut controller) in query.iter_mut() {
        if controller.frozen || controller.levitates {
            continue;
        }
        if controller.land() {
            landed_events.write(AgentLanded { entity });
        }
    }
}
