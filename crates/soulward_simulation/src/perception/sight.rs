//! Проверка видимости: FOV → дальность → окклюзия

use bevy::prelude::*;

use super::detection::Perception;
use crate::shared::{angle_between_degrees, flatten};
use crate::spatial::SpatialQuery;

/// Откуда смотрит агент
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    /// Позиция ступней (для FOV)
    pub position: Vec3,
    pub eye: Vec3,
    pub forward: Vec3,
}

/// Куда смотрим
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SightTarget {
    pub position: Vec3,
    pub eye: Vec3,
}

impl Perception {
    /// Видна ли цель прямо сейчас
    ///
    /// a) внутри конуса (или бесконечного по высоте клина при ignore_vertical)
    /// b) расстояние глаз→глаз (горизонтальное при ignore_vertical) ≤ sight_radius
    /// c) на отрезке глаз→глаз нет environment геометрии
    pub fn can_see_target(
        &self,
        viewer: &Viewpoint,
        target: &SightTarget,
        spatial: &dyn SpatialQuery,
    ) -> bool {
        if !self.in_field_of_view(viewer, target.position) {
            return false;
        }

        let line = target.eye - viewer.eye;
        let distance = if self.config.ignore_vertical {
            flatten(line).length()
        } else {
            line.length()
        };
        if distance > self.sight_radius {
            return false;
        }

        // окклюдеры за целью не считаются — луч ровно до глаз цели
        spatial.cast_segment(viewer.eye, target.eye).is_none()
    }

    pub fn in_field_of_view(&self, viewer: &Viewpoint, target_position: Vec3) -> bool {
        if self.fov >= 360.0 {
            return true;
        }

        let (displacement, forward) = if self.config.ignore_vertical {
            (flatten(target_position - viewer.position), flatten(viewer.forward))
        } else {
            (target_position - viewer.position, viewer.forward)
        };

        // цель в той же точке — считаем в поле зрения
        if displacement.length_squared() < 1e-8 {
            return true;
        }

        angle_between_degrees(forward, displacement) <= self.fov / 2.0
    }
}
