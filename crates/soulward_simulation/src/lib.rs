//! SOULWARD Simulation Core
//!
//! ECS-симуляция NPC на Bevy 0.16: восприятие, маршруты, боевые таймеры,
//! kinematic движение.
//!
//! Два темпа:
//! - Update (decision tick): запросы → восприятие/решения
//! - FixedUpdate 60Hz (physics tick): движение агентов → физика → бой
//!
//! Rapier используется только как источник геометрии для raycast; без него
//! сцена описывается `StaticGeometry` (headless тесты).

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod agent;
pub mod combat;
pub mod config;
pub mod locomotion;
pub mod logger;
pub mod path;
pub mod perception;
pub mod session;
pub mod shared;
pub mod spatial;

// Re-export для удобства
pub use agent::{
    spawn_agent, spawn_target, Agent, AgentBehavior, AgentHooks, AgentPlugin, AgentPresentation,
    AgentRequest, AttackFired, ChaseStyle, DetectionChanged, Disturbance, PathProgressed,
};
pub use combat::{
    AttackTimer, ChargeAttack, CombatPlugin, DamageDealt, Dead, EntityDied, Health, MeleeStrike,
    Stun,
};
pub use config::{AgentProfile, CombatConfig, ConfigError};
pub use locomotion::{AgentLanded, KinematicController, LocomotionPlugin, MovementConfig};
pub use path::{PathConfig, PathFollower, PathStatus, Waypoint, WaypointAction};
pub use perception::{DetectionEdge, DetectionTarget, Perception, PerceptionConfig, PerceptionPlugin};
pub use session::GameSession;
pub use spatial::{SpatialQuery, StaticGeometry, SurfaceTag};

/// Порядок фаз симуляции
///
/// Update: Requests → Decide
/// FixedUpdate: Act → Physics → Combat
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Запросы расследования, шум, safe zone цели
    Requests,
    /// Восприятие + реакция на edges
    Decide,
    /// Агенты выбирают движение (velocity deltas)
    Act,
    /// Интеграция velocity, grounding, приземление
    Physics,
    /// Урон, смерть, уборка тел
    Combat,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (SimulationSet::Requests, SimulationSet::Decide).chain(),
        )
        .configure_sets(
            FixedUpdate,
            (
                SimulationSet::Act,
                SimulationSet::Physics,
                SimulationSet::Combat,
            )
                .chain(),
        );

        app
            // Fixed timestep 60Hz для physics tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<GameSession>()
            .register_type::<GameSession>()
            .add_plugins((LocomotionPlugin, PerceptionPlugin, CombatPlugin, AgentPlugin));

        // create_headless_app уже мог поставить RNG с нужным seed
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
