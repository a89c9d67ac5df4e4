//! Steering — целевое движение и повороты поверх KinematicController
//!
//! `Motor` собирает на время тика всё, что нужно для управления телом:
//! состояние контроллера, transform, конфиг и dt.

use bevy::prelude::*;

use super::controller::{rotate_around_pivot, Gait, KinematicController, MovementConfig, RotationStyle};
use crate::shared::{angle_between_degrees, flatten, is_finite_vec};

pub struct Motor<'a> {
    pub controller: &'a mut KinematicController,
    pub transform: &'a mut Transform,
    pub config: &'a MovementConfig,
    pub dt: f32,
}

impl<'a> Motor<'a> {
    pub fn new(
        controller: &'a mut KinematicController,
        transform: &'a mut Transform,
        config: &'a MovementConfig,
        dt: f32,
    ) -> Self {
        Self {
            controller,
            transform,
            config,
            dt,
        }
    }

    pub fn body_position(&self) -> Vec3 {
        self.config.body_point(self.transform)
    }

    pub fn eye_level(&self) -> Vec3 {
        self.config.eye_point(self.transform)
    }

    pub fn forward(&self) -> Vec3 {
        *self.transform.forward()
    }

    pub fn set_gait(&mut self, gait: Gait) {
        self.controller.set_gait(gait, self.config);
    }

    /// Идти к точке. true — уже на месте (в пределах `reach`).
    ///
    /// reach ≤ 0 → distance_error из конфига.
    pub fn move_towards(
        &mut self,
        point: Vec3,
        reach: f32,
        walking_plane: bool,
        style: RotationStyle,
    ) -> bool {
        if !is_finite_vec(point) {
            return false;
        }

        let mut offset = point - self.body_position();
        if walking_plane {
            offset.y = 0.0;
        }

        let reach = if reach <= 0.0 { self.config.distance_error } else { reach };
        if offset.length() < reach {
            return true;
        }

        self.face_target(point, style);
        self.controller
            .move_in_direction(offset, walking_plane, self.config, self.dt);
        false
    }

    /// Мгновенный поворот к точке (от уровня глаз)
    pub fn face_target(&mut self, point: Vec3, style: RotationStyle) {
        if style == RotationStyle::None || !is_finite_vec(point) {
            return;
        }

        let direction = point - self.eye_level();
        if direction.length_squared() < 0.01 {
            return;
        }

        let pivot = self.body_position();
        let target_rotation = match style {
            RotationStyle::Space3D => {
                let up = self.transform.up();
                Transform::IDENTITY.looking_to(direction, up).rotation
            }
            RotationStyle::WalkingPlane => {
                let flat = flatten(direction);
                if flat.length_squared() < 1e-6 {
                    return;
                }
                // forward = -Z → yaw = atan2(-x, -z)
                let yaw = (-flat.x).atan2(-flat.z);
                let (_, pitch, roll) = self.transform.rotation.to_euler(EulerRot::YXZ);
                Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll)
            }
            RotationStyle::None => return,
        };

        let delta = target_rotation * self.transform.rotation.inverse();
        rotate_around_pivot(self.transform, pivot, delta);
    }

    /// Повернуться к направлению не быстрее rotate_speed.
    ///
    /// true — направление достигнуто (в пределах rotation_error).
    /// Вырожденное направление считается достигнутым.
    pub fn turn_towards(&mut self, direction: Vec3, walking_plane: bool) -> bool {
        let (direction, forward) = if walking_plane {
            (flatten(direction), flatten(self.forward()))
        } else {
            (direction, self.forward())
        };

        let (Some(direction), Some(forward)) = (direction.try_normalize(), forward.try_normalize())
        else {
            return true;
        };

        let offset = angle_between_degrees(forward, direction);
        if offset < self.config.rotation_error {
            return true;
        }

        // антипараллельно — cross вырожден, крутимся вокруг вертикали
        let axis = forward.cross(direction).try_normalize().unwrap_or(Vec3::Y);
        let step = (self.config.rotate_speed * self.dt).min(offset);
        let pivot = self.body_position();
        rotate_around_pivot(self.transform, pivot, Quat::from_axis_angle(axis, step.to_radians()));
        false
    }

    /// Поворот на месте вокруг мировой Y (по часовой — если смотреть сверху)
    pub fn fixed_turn(&mut self, clockwise: bool) {
        let mut degrees = self.config.rotate_speed * self.dt;
        if clockwise {
            degrees = -degrees;
        }
        let delta = Quat::from_rotation_y(degrees.to_radians());
        self.transform.rotation = (delta * self.transform.rotation).normalize();
    }

    pub fn close_to(&self, target: Vec3, distance: f32, walking_plane: bool) -> bool {
        let mut offset = target - self.body_position();
        if walking_plane {
            offset.y = 0.0;
        }
        offset.length() <= distance
    }

    pub fn can_jump(&self) -> bool {
        self.controller.can_jump()
    }

    pub fn jump(&mut self) -> bool {
        self.controller.jump(self.config)
    }
}
