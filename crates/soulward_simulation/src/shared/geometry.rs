//! Векторные хелперы для движения и восприятия

use bevy::prelude::*;

/// Проекция на плоскость ходьбы (y = 0)
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

pub fn is_finite_vec(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

/// Убирает из `velocity` часть, сонаправленную с `dir`.
///
/// Антипараллельная компонента остаётся (она только тормозит).
pub fn remove_aligned_component(velocity: Vec3, dir: Vec3) -> Vec3 {
    let Some(axis) = dir.try_normalize() else {
        return velocity;
    };

    let aligned = velocity.dot(axis);
    if aligned <= 0.0 {
        return velocity;
    }
    velocity - axis * aligned
}

/// |cos| угла с вертикалью не меньше threshold
pub fn is_mostly_vertical(dir: Vec3, threshold: f32) -> bool {
    dir.normalize_or_zero().dot(Vec3::Y).abs() >= threshold
}

pub fn is_mostly_horizontal(dir: Vec3, threshold: f32) -> bool {
    dir.normalize_or_zero().dot(Vec3::Y).abs() < threshold
}

/// Угол между векторами в градусах, [0, 180]
pub fn angle_between_degrees(a: Vec3, b: Vec3) -> f32 {
    let dot = a.normalize_or_zero().dot(b.normalize_or_zero());
    dot.clamp(-1.0, 1.0).acos().to_degrees()
}
