//! Kinematic контроллер персонажа
//!
//! Velocity интегрируем сами (Rapier только для запросов/коллизий сцены).
//! Все операции чистые: берут `MovementConfig` + dt, никаких ECS зависимостей,
//! поэтому тестируются напрямую.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::{count_down, flatten, is_finite_vec, remove_aligned_component, sanitize_dt};
use crate::spatial::{SpatialQuery, SurfaceTag};

/// Параметры движения (tuning, не меняется в рантайме)
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct MovementConfig {
    /// Скорость шага (m/s)
    pub walk_speed: f32,
    /// Скорость бега (m/s)
    pub run_speed: f32,
    /// Скорость поворота (deg/s)
    pub rotate_speed: f32,
    pub jump_force: f32,
    /// Пауза между прыжками (s) — не даёт прыгнуть дважды до отрыва от земли
    pub jump_cooldown: f32,
    /// Гравитация (m/s², отрицательная)
    pub gravity: f32,
    pub air_drag: f32,
    pub ground_drag: f32,
    /// Длительность stagger после knockback (s)
    pub flinch_time: f32,
    /// Множитель мгновенных импульсов (прыжок, knockback) — перебивает drag
    pub impulse_scale: f32,
    /// Множитель набора скорости в `move_in_direction`
    pub acceleration: f32,
    /// Допуск "стоит на земле" между ступнями и поверхностью (m)
    pub ground_clearance: f32,
    /// Ниже этой высоты — пустота (void)
    pub fall_limit: f32,
    /// Ступни → центр тела (m)
    pub body_offset: f32,
    /// Центр тела → глаза (m)
    pub eye_height: f32,
    /// Насколько близко к точке = "дошёл" (m)
    pub distance_error: f32,
    /// Угловой допуск для turn_towards (deg)
    pub rotation_error: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 4.0,
            run_speed: 10.0,
            rotate_speed: 60.0,
            jump_force: 6.4,
            jump_cooldown: 0.4,
            gravity: -21.0,
            air_drag: 1.0,
            ground_drag: 5.0,
            flinch_time: 0.4,
            impulse_scale: 3.0,
            acceleration: 10.0,
            ground_clearance: 0.1,
            fall_limit: -50.0,
            body_offset: 0.9,
            eye_height: 0.7,
            distance_error: 0.5,
            rotation_error: 1.0,
        }
    }
}

impl MovementConfig {
    /// Центр тела (pivot для поворотов)
    pub fn body_point(&self, transform: &Transform) -> Vec3 {
        transform.translation + transform.rotation * Vec3::Y * self.body_offset
    }

    pub fn eye_point(&self, transform: &Transform) -> Vec3 {
        transform.translation + transform.rotation * Vec3::Y * (self.body_offset + self.eye_height)
    }

    pub fn gait_speed(&self, gait: Gait) -> f32 {
        match gait {
            Gait::Walk => self.walk_speed,
            Gait::Run => self.run_speed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum Gait {
    #[default]
    Walk,
    Run,
}

/// Как поворачиваться к цели
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum RotationStyle {
    None,
    /// Только yaw
    #[default]
    WalkingPlane,
    /// Полный 3D поворот
    Space3D,
}

/// Маркер: jump/stagger таймеры крутит владелец (decision tick агента),
/// а не физический шаг.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct ExternalClock;

/// Смена опорной поверхности за тик
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroundChange {
    pub left: Option<Entity>,
    pub entered: Option<Entity>,
}

/// Состояние kinematic персонажа
///
/// Инварианты:
/// - move_speed ≥ 0 (setter клампит)
/// - jump_timer, stagger_timer ≥ 0
/// - current_ground — слабая ссылка, поверхность не принадлежит персонажу
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
#[require(MovementConfig)]
pub struct KinematicController {
    pub velocity: Vec3,
    pub(crate) move_speed: f32,
    pub grounded: bool,
    pub jumping: bool,
    /// До следующего прыжка (s)
    pub jump_timer: f32,
    /// Flinch recovery (s)
    pub stagger_timer: f32,
    /// Парит — без гравитации и проверки земли
    pub levitates: bool,
    /// Заморожен (мёртв) — физика не трогает
    pub frozen: bool,
    /// Ниже fall_limit
    pub in_void: bool,
    pub previous_position: Option<Vec3>,
    pub current_ground: Option<Entity>,
    pub ground_tag: Option<SurfaceTag>,
}

impl Default for KinematicController {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            move_speed: MovementConfig::default().walk_speed,
            grounded: false,
            jumping: false,
            jump_timer: 0.0,
            stagger_timer: 0.0,
            levitates: false,
            frozen: false,
            in_void: false,
            previous_position: None,
            current_ground: None,
            ground_tag: None,
        }
    }
}

impl KinematicController {
    pub fn new(config: &MovementConfig) -> Self {
        Self {
            move_speed: config.walk_speed.max(0.0),
            ..default()
        }
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    /// Отрицательная/NaN скорость → 0
    pub fn set_move_speed(&mut self, speed: f32) {
        self.move_speed = if speed.is_finite() && speed > 0.0 { speed } else { 0.0 };
    }

    pub fn set_gait(&mut self, gait: Gait, config: &MovementConfig) {
        self.set_move_speed(config.gait_speed(gait));
    }

    pub fn is_running(&self, config: &MovementConfig) -> bool {
        self.move_speed >= config.run_speed
    }

    pub fn flat_velocity(&self) -> Vec3 {
        flatten(self.velocity)
    }

    pub fn horizontal_speed(&self) -> f32 {
        self.flat_velocity().length()
    }

    pub fn is_flinching(&self) -> bool {
        self.stagger_timer > 0.0
    }

    pub fn jump_ready(&self) -> bool {
        self.jump_timer <= 0.0
    }

    pub fn can_jump(&self) -> bool {
        self.grounded && self.jump_ready()
    }

    /// Ускорение в направлении `direction`.
    ///
    /// Если контролируемая скорость уже ≥ move_speed — сонаправленная часть
    /// дельты убирается, затем результат клампится до max(move_speed, |v_prev|).
    /// Сколько бы раз ни вызвали за тик, выше потолка не разгонимся.
    pub fn move_in_direction(
        &mut self,
        direction: Vec3,
        walking_plane: bool,
        config: &MovementConfig,
        dt: f32,
    ) {
        let dt = sanitize_dt(dt);
        if !is_finite_vec(direction) || dt == 0.0 {
            return;
        }

        let direction = if walking_plane { flatten(direction) } else { direction };
        let Some(direction) = direction.try_normalize() else {
            return;
        };

        let controlled = |v: Vec3| if walking_plane { flatten(v) } else { v };

        let current = controlled(self.velocity);
        let current_speed = current.length();
        let limit = self.move_speed;

        let mut delta = direction * limit * dt * config.acceleration;
        if current_speed >= limit {
            delta = remove_aligned_component(delta, current);
        }

        let mut next = self.velocity + delta;
        let ceiling = limit.max(current_speed);
        let next_controlled = controlled(next);
        let next_speed = next_controlled.length();
        if next_speed > ceiling && next_speed > 0.0 {
            let scaled = next_controlled * (ceiling / next_speed);
            next = if walking_plane {
                Vec3::new(scaled.x, next.y, scaled.z)
            } else {
                scaled
            };
        }

        self.velocity = next;
    }

    /// Прыжок с земли. true — если прыжок состоялся.
    pub fn jump(&mut self, config: &MovementConfig) -> bool {
        if !self.can_jump() || self.frozen {
            return false;
        }

        self.stop_falling();
        self.velocity.y += config.jump_force * config.impulse_scale;
        self.jump_timer = config.jump_cooldown;
        self.jumping = true;
        self.grounded = false;
        true
    }

    /// Приземление после прыжка (срабатывает один раз)
    pub fn land(&mut self) -> bool {
        if self.jumping && self.can_jump() {
            self.jumping = false;
            return true;
        }
        false
    }

    /// Мгновенная потеря контроля: скорость в ноль, запуск flinch таймера
    pub fn stagger(&mut self, config: &MovementConfig) {
        self.stagger_timer = config.flinch_time;
        self.velocity = Vec3::ZERO;
    }

    /// Knockback: stagger + импульс. Итог не зависит от прежней скорости.
    pub fn apply_knockback(&mut self, force: Vec3, config: &MovementConfig) {
        if !is_finite_vec(force) {
            return;
        }
        self.stagger(config);
        self.velocity += force * config.impulse_scale;
    }

    /// Обнуляет только отрицательную вертикальную скорость
    pub fn stop_falling(&mut self) {
        if self.velocity.y < 0.0 {
            self.velocity.y = 0.0;
        }
    }

    pub fn apply_gravity(&mut self, height: f32, config: &MovementConfig, dt: f32) {
        if self.levitates || self.grounded {
            return;
        }
        if height > config.fall_limit {
            self.velocity.y += config.gravity * sanitize_dt(dt);
        }
    }

    pub fn apply_drag(&mut self, config: &MovementConfig, dt: f32) {
        let drag = if self.grounded {
            config.ground_drag
        } else {
            config.air_drag
        };
        let factor = (1.0 - drag * sanitize_dt(dt)).clamp(0.0, 1.0);
        self.velocity *= factor;
    }

    /// Jump cooldown + flinch recovery
    pub fn cool_down(&mut self, dt: f32) {
        count_down(&mut self.jump_timer, dt);
        count_down(&mut self.stagger_timer, dt);
    }

    /// Ниже fall_limit → void, падение останавливается
    pub fn check_world_limits(&mut self, height: f32, config: &MovementConfig) -> bool {
        self.in_void = height <= config.fall_limit;
        if self.in_void {
            self.stop_falling();
        }
        self.in_void
    }

    pub fn make_levitate(&mut self) {
        self.levitates = true;
        self.grounded = false;
    }

    /// Проверка земли.
    ///
    /// 1. Луч вниз из центра тела длиной body_offset + clearance.
    /// 2. Промах → луч от позиции прошлого тика к текущей (туннелирование
    ///    на большой скорости); попадание → снап на поверхность + clearance.
    ///
    /// Возвращает смену опорной поверхности (для пассажиров платформ).
    pub fn detect_ground(
        &mut self,
        transform: &mut Transform,
        config: &MovementConfig,
        spatial: &dyn SpatialQuery,
    ) -> Option<GroundChange> {
        let feet = transform.translation;
        let body = feet + Vec3::Y * config.body_offset;
        let reach = config.body_offset + config.ground_clearance;

        let mut hit = spatial.cast_ray(body, Dir3::NEG_Y, reach);
        if let Some(surface) = hit {
            // не проваливаемся сквозь пол, пока стоим
            if self.velocity.y <= 0.0 && transform.translation.y < surface.point.y {
                transform.translation.y = surface.point.y;
            }
        } else if let Some(previous) = self.previous_position {
            if let Some(surface) = spatial.cast_segment(previous, feet) {
                transform.translation.y = surface.point.y + config.ground_clearance;
                hit = Some(surface);
            }
        }

        self.previous_position = Some(transform.translation);
        self.grounded = hit.is_some();
        self.ground_tag = hit.map(|h| h.tag);
        if self.grounded {
            self.stop_falling();
        }

        let ground = hit.and_then(|h| h.entity);
        self.stand_on(ground)
    }

    fn stand_on(&mut self, ground: Option<Entity>) -> Option<GroundChange> {
        if ground == self.current_ground {
            return None;
        }
        let change = GroundChange {
            left: self.current_ground,
            entered: ground,
        };
        self.current_ground = ground;
        Some(change)
    }
}

/// Поворот вокруг pivot с сохранением расстояния до него
///
/// Позиция двигается только при заметном смещении от pivot (> 0.2m).
pub fn rotate_around_pivot(transform: &mut Transform, pivot: Vec3, delta: Quat) {
    if !delta.is_finite() {
        return;
    }
    transform.rotation = (delta * transform.rotation).normalize();

    let relative = transform.translation - pivot;
    if relative.length_squared() > 0.04 {
        transform.translation = pivot + delta * relative;
    }
}

/// Направление knockback: forward, повёрнутый по pitch вокруг right оси
///
/// pitch < 0 — вверх (по умолчанию -45°).
pub fn knockback_vector(attacker: &Transform, power: f32, pitch_degrees: f32) -> Vec3 {
    let right = *attacker.right();
    let forward = *attacker.forward();
    let direction = Quat::from_axis_angle(right, -pitch_degrees.to_radians()) * forward;
    direction.normalize_or_zero() * power
}
