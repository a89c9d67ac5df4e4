//! Perception — зрение агентов и обнаружение цели
//!
//! - sight: FOV + дальность + линия взгляда через SpatialQuery
//! - detection: латч обнаружения с grace периодом, edge-triggered события
//! - target: DetectionTarget (общий счётчик обнаружений, безопасная зона)
//!
//! Опрос восприятия делает agent orchestrator в decision tick.

use bevy::prelude::*;

pub mod detection;
pub mod sight;
pub mod target;

pub use detection::{DetectionEdge, Perception, PerceptionConfig};
pub use sight::{SightTarget, Viewpoint};
pub use target::DetectionTarget;

use crate::SimulationSet;

pub struct PerceptionPlugin;

impl Plugin for PerceptionPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Perception>()
            .register_type::<DetectionTarget>();

        // безопасность цели обновляется до опроса восприятия
        app.add_systems(
            Update,
            target::refresh_target_safety.in_set(SimulationSet::Requests),
        );
    }
}
