//! Locomotion — kinematic движение персонажей
//!
//! Архитектура:
//! - Rapier только для коллайдеров сцены и raycast (через SpatialQuery)
//! - Custom velocity integration: drag, gravity, прыжки, knockback
//! - Ground detection лучом + защита от туннелирования
//!
//! Детерминизм: fixed timestep 60Hz, порядок систем фиксирован `.chain()`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, RigidBody, Velocity};

pub mod controller;
pub mod passengers;
pub mod steering;
pub mod systems;


pub use controller::{
    knockback_vector, rotate_around_pivot, ExternalClock, Gait, GroundChange, KinematicController,
    MovementConfig, RotationStyle,
};
pub use passengers::PlatformPassengers;
pub use steering::Motor;
pub use systems::AgentLanded;

use crate::spatial::agent_groups;
use crate::SimulationSet;

/// Plugin физического шага персонажей
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AgentLanded>()
            .register_type::<KinematicController>()
            .register_type::<MovementConfig>()
            .register_type::<PlatformPassengers>();

        app.add_systems(
            FixedUpdate,
            (
                systems::tick_character_timers,
                systems::check_world_limits,
                systems::apply_drag,
                systems::apply_gravity,
                systems::integrate_velocity,
                systems::detect_ground,
                systems::land_characters,
            )
                .chain()
                .in_set(SimulationSet::Physics),
        );
    }
}

/// Spawn kinematic персонажа (цель / игрок / тестовый манекен)
///
/// Rapier компоненты — только для коллизий сцены; velocity интегрируем сами.
pub fn spawn_character(commands: &mut Commands, position: Vec3, config: MovementConfig) -> Entity {
    let radius = 0.4;
    let half_height = (config.body_offset - radius).max(0.1);
    let controller = KinematicController::new(&config);

    commands
        .spawn((
            Transform::from_translation(position),
            config,
            controller,
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(half_height, radius),
            Velocity::default(),
            agent_groups(),
        ))
        .id()
}
