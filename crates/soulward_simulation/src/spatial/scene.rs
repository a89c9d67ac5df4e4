//! SceneQuery — SystemParam для raycast из систем

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::ReadRapierContext;

use super::{nearest_hit, rapier, RayHit, SpatialQuery, StaticGeometry, SurfaceTag};

/// Объединённая сцена: `StaticGeometry` (если есть) + Rapier контекст (если есть)
#[derive(SystemParam)]
pub struct SceneQuery<'w, 's> {
    geometry: Option<Res<'w, StaticGeometry>>,
    rapier_context: ReadRapierContext<'w, 's>,
    surfaces: Query<'w, 's, &'static SurfaceTag>,
}

impl SpatialQuery for SceneQuery<'_, '_> {
    fn cast_ray(&self, origin: Vec3, direction: Dir3, max_distance: f32) -> Option<RayHit> {
        let static_hit = self
            .geometry
            .as_ref()
            .and_then(|geometry| geometry.cast_ray(origin, direction, max_distance));

        // Нет RapierPhysicsPlugin → контекста нет, работаем только по StaticGeometry
        let physics_hit = self.rapier_context.single().ok().and_then(|context| {
            rapier::cast_tagged_ray(&context, &self.surfaces, origin, direction, max_distance)
        });

        nearest_hit(static_hit, physics_hit)
    }
}
