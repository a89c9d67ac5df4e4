//! StaticGeometry — headless набор AABB боксов
//!
//! Используется без Rapier plugin (тесты, dedicated simulation).
//! Raycast — slab test; луч, стартующий внутри бокса, этот бокс не видит.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, RigidBody};

use super::{environment_groups, RayHit, SpatialQuery, SurfaceTag};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticBox {
    pub min: Vec3,
    pub max: Vec3,
    pub tag: SurfaceTag,
    pub entity: Option<Entity>,
}

impl StaticBox {
    pub fn from_center(center: Vec3, half_extents: Vec3, tag: SurfaceTag) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
            tag,
            entity: None,
        }
    }

    /// Slab test. Возвращает (distance, normal входной грани).
    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < 1e-8 {
                // параллельно граням — либо внутри слэба, либо мимо
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            if t0 > t_enter {
                t_enter = t0;
                normal = Vec3::AXES[axis] * -d.signum();
            }
            t_exit = t_exit.min(t1);

            if t_enter > t_exit {
                return None;
            }
        }

        if t_enter < 0.0 {
            return None;
        }
        Some((t_enter, normal))
    }
}

/// Статическая геометрия уровня (resource)
#[derive(Resource, Debug, Clone, Default)]
pub struct StaticGeometry {
    boxes: Vec<StaticBox>,
}

impl StaticGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, static_box: StaticBox) -> &mut Self {
        self.boxes.push(static_box);
        self
    }

    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, tag: SurfaceTag) -> &mut Self {
        self.add(StaticBox::from_center(center, half_extents, tag))
    }

    /// Пол: верхняя грань на высоте `height`, толщина 1m
    pub fn add_floor(&mut self, height: f32, half_size: f32, tag: SurfaceTag) -> &mut Self {
        self.add_box(
            Vec3::new(0.0, height - 0.5, 0.0),
            Vec3::new(half_size, 0.5, half_size),
            tag,
        )
    }

    pub fn with_box(mut self, center: Vec3, half_extents: Vec3, tag: SurfaceTag) -> Self {
        self.add_box(center, half_extents, tag);
        self
    }

    pub fn with_floor(mut self, height: f32, half_size: f32, tag: SurfaceTag) -> Self {
        self.add_floor(height, half_size, tag);
        self
    }

    pub fn boxes(&self) -> &[StaticBox] {
        &self.boxes
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
    }
}

impl SpatialQuery for StaticGeometry {
    fn cast_ray(&self, origin: Vec3, direction: Dir3, max_distance: f32) -> Option<RayHit> {
        if !max_distance.is_finite() || max_distance < 0.0 {
            return None;
        }

        let dir = *direction;
        self.boxes
            .iter()
            .filter_map(|b| {
                let (distance, normal) = b.intersect(origin, dir)?;
                (distance <= max_distance).then(|| RayHit {
                    point: origin + dir * distance,
                    normal,
                    distance,
                    tag: b.tag,
                    entity: b.entity,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Spawn environment бокса: Rapier коллайдер + запись в `StaticGeometry`
///
/// Оба представления ссылаются на один entity (нужно для платформ).
pub fn spawn_environment_box(
    commands: &mut Commands,
    geometry: &mut StaticGeometry,
    center: Vec3,
    half_extents: Vec3,
    tag: SurfaceTag,
) -> Entity {
    let half = half_extents.abs();
    let entity = commands
        .spawn((
            Transform::from_translation(center),
            tag,
            RigidBody::Fixed,
            Collider::cuboid(half.x, half.y, half.z),
            environment_groups(),
        ))
        .id();

    geometry.add(StaticBox {
        entity: Some(entity),
        ..StaticBox::from_center(center, half, tag)
    });
    entity
}
