//! Spawn helpers для агентов и цели

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, RigidBody, Velocity};

use super::components::{Agent, AgentHooks};
use crate::combat::{melee_strike, Health, Stun};
use crate::config::AgentProfile;
use crate::locomotion::{spawn_character, KinematicController, MovementConfig};
use crate::path::PathFollower;
use crate::perception::{DetectionTarget, Perception};
use crate::spatial::agent_groups;

/// Spawn агента по профилю
///
/// Attack hook по умолчанию — melee_strike из профиля; заменить можно
/// вставкой своего `AgentHooks` после spawn.
pub fn spawn_agent(commands: &mut Commands, profile: &AgentProfile, position: Vec3) -> Entity {
    let movement = profile.movement.clone();
    let controller = KinematicController::new(&movement);
    let radius = 0.4;
    let half_height = (movement.body_offset - radius).max(0.1);

    let mut entity = commands.spawn((
        Name::new(profile.name.clone()),
        Agent::default(),
        Transform::from_translation(position),
        movement,
        controller,
        Perception::new(profile.perception.clone()),
        PathFollower::new(profile.path.clone().unwrap_or_default()),
        profile.behavior.clone(),
        AgentHooks::default().with_attack(melee_strike(profile.combat.strike)),
    ));

    entity.insert((
        profile.combat.attack_timer(),
        profile.combat.health(),
        RigidBody::KinematicPositionBased,
        Collider::capsule_y(half_height, radius),
        Velocity::default(),
        agent_groups(),
    ));

    if let Some(charge) = profile.combat.charge.clone() {
        entity.insert(charge);
    }

    let id = entity.id();
    crate::logger::log(&format!(
        "🧟 Spawned agent '{}' {:?} at {:?}",
        profile.name, id, position
    ));
    id
}

/// Spawn цели (игрока / манекена): kinematic персонаж + DetectionTarget
pub fn spawn_target(commands: &mut Commands, position: Vec3, config: MovementConfig) -> Entity {
    let entity = spawn_character(commands, position, config);
    commands.entity(entity).insert((
        Name::new("target"),
        DetectionTarget::default(),
        Health::default(),
        Stun::default(),
    ));
    entity
}
