//! Spatial queries — raycast абстракция над геометрией сцены
//!
//! Поведение агентов (земля, линия взгляда, сенсор препятствий) спрашивает
//! сцену только через `SpatialQuery`:
//! - `StaticGeometry` — headless AABB боксы (тесты, серверная симуляция)
//! - Rapier адаптер — коллайдеры с `SurfaceTag`
//! - `SceneQuery` — SystemParam, опрашивает обе и берёт ближайшее попадание
//!
//! Контракт: попадания только по environment поверхностям (есть `SurfaceTag`).
//! Агенты, снаряды и прочие коллайдеры без тега прозрачны.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod geometry;
pub mod layers;
pub mod rapier;
pub mod scene;

pub use geometry::{spawn_environment_box, StaticBox, StaticGeometry};
pub use layers::{agent_groups, environment_groups};
pub use scene::SceneQuery;

/// Тег физической поверхности (можно стоять, блокирует взгляд)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub enum SurfaceTag {
    #[default]
    Environment,
    /// Безопасная зона: цель на такой поверхности невидима для агентов
    SafeEnvironment,
}

impl SurfaceTag {
    pub fn is_safe(self) -> bool {
        matches!(self, SurfaceTag::SafeEnvironment)
    }
}

/// Результат raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    pub tag: SurfaceTag,
    /// Entity поверхности (платформа), если известна
    pub entity: Option<Entity>,
}

pub trait SpatialQuery {
    /// Ближайшее попадание по environment поверхности в пределах `max_distance`
    fn cast_ray(&self, origin: Vec3, direction: Dir3, max_distance: f32) -> Option<RayHit>;

    /// Первая поверхность на отрезке `from → to`
    fn cast_segment(&self, from: Vec3, to: Vec3) -> Option<RayHit> {
        let offset = to - from;
        let direction = Dir3::new(offset).ok()?;
        self.cast_ray(from, direction, offset.length())
    }
}

/// Пустая сцена — ничего не блокирует
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySpace;

impl SpatialQuery for EmptySpace {
    fn cast_ray(&self, _origin: Vec3, _direction: Dir3, _max_distance: f32) -> Option<RayHit> {
        None
    }
}

/// Выбирает ближайшее из двух попаданий
pub fn nearest_hit(a: Option<RayHit>, b: Option<RayHit>) -> Option<RayHit> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if a.distance <= b.distance { a } else { b }),
        (a, None) => a,
        (None, b) => b,
    }
}
