//! Agent orchestrator — NPC поведение поверх perception / path / combat / locomotion
//!
//! Архитектура:
//! - Decision tick (Update): восприятие → edge → реакция, таймеры, презентация
//! - Motion tick (FixedUpdate, до физики): ровно одно поведение за тик
//!   (погоня / атака с маршрута / расследование / маршрут)
//! - Тип врага = данные (AgentBehavior, ChaseStyle) + hooks (AgentHooks)
//!
//! Общие изменяемые данные между агентами — только счётчик обнаружений
//! цели, меняется внутри системы.

use bevy::prelude::*;

pub mod components;
pub mod decision;
pub mod events;
pub mod spawn;
pub mod systems;

#[cfg(test)]
mod decision_tests;

pub use components::{
    Agent, AgentBehavior, AgentHook, AgentHooks, AgentPresentation, ChaseStyle, Investigation,
};
pub use decision::{AgentParts, DecisionReport, MotionReport, TargetSnapshot};
pub use events::{AgentRequest, AttackFired, DetectionChanged, Disturbance, PathProgressed};
pub use spawn::{spawn_agent, spawn_target};

use crate::SimulationSet;

pub struct AgentPlugin;

impl Plugin for AgentPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AgentRequest>()
            .add_event::<Disturbance>()
            .add_event::<DetectionChanged>()
            .add_event::<AttackFired>()
            .add_event::<PathProgressed>()
            .register_type::<Agent>()
            .register_type::<AgentBehavior>()
            .register_type::<Investigation>()
            .register_type::<AgentPresentation>();

        app.add_systems(
            Update,
            (systems::spread_disturbances, systems::handle_agent_requests)
                .chain()
                .in_set(SimulationSet::Requests),
        )
        .add_systems(
            Update,
            systems::run_agent_decisions.in_set(SimulationSet::Decide),
        );

        app.add_systems(
            FixedUpdate,
            systems::run_agent_motion.in_set(SimulationSet::Act),
        )
        .add_systems(
            FixedUpdate,
            systems::react_to_landing.in_set(SimulationSet::Combat),
        );
    }
}
