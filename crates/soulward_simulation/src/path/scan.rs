//! Осмотр по дуге (Scan / FaceScan)
//!
//! Три направления: 0 — левое, 1 — центр (на waypoint), 2 — правое.
//! Слева направо: 0 → 2 → 1. Справа налево: 2 → 0 → 1.

use bevy::prelude::*;

use crate::shared::flatten;

pub const SCAN_LEFT: usize = 0;
pub const SCAN_CENTER: usize = 1;
pub const SCAN_RIGHT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOrder {
    pub from: usize,
    pub to: usize,
    pub end: usize,
}

impl ScanOrder {
    pub fn new(left_to_right: bool) -> Self {
        if left_to_right {
            Self {
                from: SCAN_LEFT,
                to: SCAN_RIGHT,
                end: SCAN_CENTER,
            }
        } else {
            Self {
                from: SCAN_RIGHT,
                to: SCAN_LEFT,
                end: SCAN_CENTER,
            }
        }
    }

    /// Следующее направление; None — осмотр закончен
    pub fn next(&self, index: usize) -> Option<usize> {
        if index == self.from {
            Some(self.to)
        } else if index == self.to {
            Some(self.end)
        } else if index == self.end {
            None
        } else {
            crate::logger::log_warning(&format!("undefined scan index {}, scan stopped", index));
            None
        }
    }
}

/// Направления осмотра из вектора "глаза → waypoint"
///
/// Вырожденный центр (waypoint прямо под/над глазами) → текущий forward.
pub fn scan_directions(eye: Vec3, destination: Vec3, forward: Vec3, arc_degrees: f32) -> [Vec3; 3] {
    let mut center = destination - eye;
    if flatten(center).length_squared() < 1e-6 {
        center = forward;
    }

    let half = (arc_degrees / 2.0).to_radians();
    // +Y поворот (против часовой сверху) — влево
    let left = Quat::from_rotation_y(half) * center;
    let right = Quat::from_rotation_y(-half) * center;

    let mut directions = [Vec3::ZERO; 3];
    directions[SCAN_LEFT] = left;
    directions[SCAN_CENTER] = center;
    directions[SCAN_RIGHT] = right;
    directions
}
