//! DetectionTarget — тот, кого ищут агенты (игрок)

use bevy::prelude::*;

use super::sight::SightTarget;
use crate::locomotion::KinematicController;

/// Цель для восприятия агентов
///
/// `detection_count` — сколько агентов сейчас отслеживают цель.
/// Общий счётчик, меняется только внутри тика, не уходит ниже нуля.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct DetectionTarget {
    /// Ступни → глаза (m)
    pub eye_height: f32,
    /// Ступни → центр тела (m)
    pub body_height: f32,
    /// В безопасной зоне — невидима для агентов
    pub safe: bool,
    pub detection_count: u32,
}

impl Default for DetectionTarget {
    fn default() -> Self {
        Self {
            eye_height: 1.6,
            body_height: 0.9,
            safe: false,
            detection_count: 0,
        }
    }
}

impl DetectionTarget {
    pub fn gain_detection(&mut self) {
        self.detection_count = self.detection_count.saturating_add(1);
    }

    pub fn lose_detection(&mut self) {
        self.detection_count = self.detection_count.saturating_sub(1);
    }

    pub fn is_detected(&self) -> bool {
        self.detection_count > 0
    }

    pub fn sight_target(&self, transform: &Transform) -> SightTarget {
        SightTarget {
            position: transform.translation,
            eye: transform.translation + Vec3::Y * self.eye_height,
        }
    }

    pub fn body_point(&self, transform: &Transform) -> Vec3 {
        transform.translation + Vec3::Y * self.body_height
    }
}

/// System: безопасность цели по тегу поверхности под ногами
///
/// Цели без KinematicController сохраняют выставленный вручную флаг.
/// В воздухе (нет поверхности под ногами) флаг не меняется.
pub fn refresh_target_safety(
    mut targets: Query<(Entity, &mut DetectionTarget, &KinematicController)>,
) {
    for (entity, mut target, controller) in targets.iter_mut() {
        let Some(tag) = controller.ground_tag else {
            continue;
        };
        let safe = tag.is_safe();
        if safe != target.safe {
            target.safe = safe;
            crate::logger::log(&format!(
                "🛡️ Target {:?} {} safe zone",
                entity,
                if safe { "entered" } else { "left" }
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    use crate::spatial::SurfaceTag;

    fn refresh(world: &mut World) {
        world
            .run_system_once(refresh_target_safety)
            .expect("system runs");
    }

    fn set_ground(world: &mut World, entity: Entity, tag: Option<SurfaceTag>) {
        let mut controller = world
            .get_mut::<KinematicController>(entity)
            .expect("controller");
        controller.ground_tag = tag;
        controller.grounded = tag.is_some();
    }

    fn safe(world: &World, entity: Entity) -> bool {
        world
            .get::<DetectionTarget>(entity)
            .is_some_and(|target| target.safe)
    }

    #[test]
    fn test_jump_from_safe_zone_keeps_safety() {
        let mut world = World::new();
        let target = world
            .spawn((DetectionTarget::default(), KinematicController::default()))
            .id();

        set_ground(&mut world, target, Some(SurfaceTag::SafeEnvironment));
        refresh(&mut world);
        assert!(safe(&world, target));

        // прыжок: под ногами ничего
        set_ground(&mut world, target, None);
        refresh(&mut world);
        assert!(safe(&world, target), "В воздухе цель остаётся в safe zone");

        set_ground(&mut world, target, Some(SurfaceTag::Environment));
        refresh(&mut world);
        assert!(!safe(&world, target));

        // прыжок с обычного пола не делает цель безопасной
        set_ground(&mut world, target, None);
        refresh(&mut world);
        assert!(!safe(&world, target));
    }

    #[test]
    fn test_detection_counter_floors_at_zero() {
        let mut target = DetectionTarget::default();
        target.lose_detection();
        assert_eq!(target.detection_count, 0);

        target.gain_detection();
        target.gain_detection();
        target.lose_detection();
        assert!(target.is_detected());
        assert_eq!(target.detection_count, 1);
    }
}
