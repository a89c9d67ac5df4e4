//! Rapier адаптер для `SpatialQuery`
//!
//! Работает поверх `RapierContext` (если RapierPhysicsPlugin подключён).
//! Учитываются только коллайдеры с `SurfaceTag`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{QueryFilter, RapierContext};

use super::{RayHit, SurfaceTag};

pub fn cast_tagged_ray(
    context: &RapierContext<'_>,
    surfaces: &Query<&SurfaceTag>,
    origin: Vec3,
    direction: Dir3,
    max_distance: f32,
) -> Option<RayHit> {
    if !max_distance.is_finite() || max_distance < 0.0 {
        return None;
    }

    let is_surface = |entity: Entity| surfaces.contains(entity);
    let filter = QueryFilter::default().predicate(&is_surface);

    let (entity, intersection) =
        context.cast_ray_and_get_normal(origin, *direction, max_distance, true, filter)?;
    let tag = surfaces.get(entity).ok().copied()?;

    Some(RayHit {
        point: intersection.point,
        normal: intersection.normal,
        distance: intersection.time_of_impact,
        tag,
        entity: Some(entity),
    })
}
