//! Agent events
//!
//! Входящие (requests) — от игрового кода к агентам.
//! Исходящие — для презентации, звука, тестов.

use bevy::prelude::*;

use crate::path::PathEvent;
use crate::perception::DetectionEdge;

/// Запросы к конкретному агенту
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum AgentRequest {
    /// Дойти до места и осмотреться (radius None → scene_radius агента)
    InvestigateScene {
        agent: Entity,
        location: Vec3,
        radius: Option<f32>,
    },
    /// Повернуться к месту и понаблюдать, не сходя с места
    InvestigateFromDistance { agent: Entity, location: Vec3 },
    /// Принудительно обнаружить цель
    FindTarget { agent: Entity },
    /// Принудительно потерять цель
    ForgetTarget { agent: Entity },
}

/// Шум в области: все агенты в радиусе идут расследовать
///
/// `uncertainty` — разброс точки (m), детерминированный от DeterministicRng.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct Disturbance {
    pub location: Vec3,
    pub radius: f32,
    pub uncertainty: f32,
}

/// Событие: агент обнаружил / потерял цель
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DetectionChanged {
    pub agent: Entity,
    pub target: Option<Entity>,
    pub edge: DetectionEdge,
}

/// Событие: агент атаковал
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackFired {
    pub agent: Entity,
    pub target: Entity,
}

/// Событие: прогресс по маршруту
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PathProgressed {
    pub agent: Entity,
    pub event: PathEvent,
}
