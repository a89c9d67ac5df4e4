//! Collision groups
//!
//! GROUP_1 — environment (пол, стены, платформы)
//! GROUP_2 — персонажи (агенты, цель)

use bevy_rapier3d::prelude::{CollisionGroups, Group};

pub const ENVIRONMENT: Group = Group::GROUP_1;
pub const CHARACTERS: Group = Group::GROUP_2;

/// Персонажи сталкиваются с окружением и друг с другом
pub fn agent_groups() -> CollisionGroups {
    CollisionGroups::new(CHARACTERS, ENVIRONMENT | CHARACTERS)
}

pub fn environment_groups() -> CollisionGroups {
    CollisionGroups::new(ENVIRONMENT, CHARACTERS)
}
