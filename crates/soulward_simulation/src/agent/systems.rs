//! Agent systems
//!
//! Update:
//! - Requests: spread_disturbances → handle_agent_requests
//! - Decide: run_agent_decisions (восприятие, edges, таймеры, презентация)
//!
//! FixedUpdate:
//! - Act: run_agent_motion (погоня / расследование / маршрут)
//! - Combat: react_to_landing (attack_on_land, on_land hook)

use bevy::ecs::query::QueryData;
use bevy::prelude::*;
use rand::Rng;

use super::components::*;
use super::decision::{act, decide, handle_edge, start_investigation, AgentParts, TargetSnapshot};
use super::events::*;
use crate::combat::{AttackTimer, ChargeAttack, Dead};
use crate::locomotion::{AgentLanded, KinematicController, MovementConfig};
use crate::path::PathFollower;
use crate::perception::{DetectionEdge, DetectionTarget, Perception};
use crate::spatial::SceneQuery;
use crate::DeterministicRng;

/// Полное состояние агента для decision / motion тиков
#[derive(QueryData)]
#[query_data(mutable)]
pub struct AgentQuery {
    entity: Entity,
    agent: &'static Agent,
    transform: &'static mut Transform,
    config: &'static MovementConfig,
    controller: &'static mut KinematicController,
    perception: &'static mut Perception,
    path: &'static mut PathFollower,
    attack: &'static mut AttackTimer,
    charge: Option<&'static mut ChargeAttack>,
    behavior: &'static AgentBehavior,
    investigation: &'static mut Investigation,
    presentation: &'static mut AgentPresentation,
    dead: Has<Dead>,
}

type TargetQuery<'w, 's> =
    Query<'w, 's, (Entity, &'static Transform, &'static mut DetectionTarget), Without<Agent>>;

fn agent_parts<'a>(item: &'a mut AgentQueryItem<'_>) -> AgentParts<'a> {
    AgentParts {
        entity: item.entity,
        transform: &mut item.transform,
        config: item.config,
        controller: &mut item.controller,
        perception: &mut item.perception,
        path: &mut item.path,
        attack: &mut item.attack,
        charge: item.charge.as_deref_mut(),
        behavior: item.behavior,
        investigation: &mut item.investigation,
    }
}

/// Цель по умолчанию — DetectionTarget с наименьшим индексом (детерминизм)
fn default_target(targets: &TargetQuery) -> Option<Entity> {
    targets
        .iter()
        .map(|(entity, _, _)| entity)
        .min_by_key(|entity| entity.index())
}

/// Явная цель → закреплённая при обнаружении → цель по умолчанию
fn resolve_target(agent: &Agent, perception: &Perception, fallback: Option<Entity>) -> Option<Entity> {
    agent.target.or(perception.tracked).or(fallback)
}

fn snapshot_target(targets: &TargetQuery, entity: Entity) -> Option<TargetSnapshot> {
    let (entity, transform, target) = targets.get(entity).ok()?;
    Some(TargetSnapshot {
        entity,
        position: transform.translation,
        eye: target.sight_target(transform).eye,
        body: target.body_point(transform),
        safe: target.safe,
    })
}

/// Общий счётчик обнаружений + событие + hooks
fn apply_detection_edge(
    commands: &mut Commands,
    agent: Entity,
    target: Option<Entity>,
    edge: DetectionEdge,
    targets: &mut TargetQuery,
    hooks: &Query<&AgentHooks>,
    events: &mut EventWriter<DetectionChanged>,
) {
    if let Some(Ok((_, _, mut detection))) = target.map(|entity| targets.get_mut(entity)) {
        match edge {
            DetectionEdge::Detected => detection.gain_detection(),
            DetectionEdge::Lost => detection.lose_detection(),
        }
    }

    events.write(DetectionChanged {
        agent,
        target,
        edge,
    });

    match edge {
        DetectionEdge::Detected => {
            crate::logger::log(&format!("👁️ {:?} detected target {:?}", agent, target));
        }
        DetectionEdge::Lost => {
            crate::logger::log(&format!("❓ {:?} lost target {:?}", agent, target));
        }
    }

    let Ok(hooks) = hooks.get(agent) else {
        return;
    };
    let hook = match edge {
        DetectionEdge::Detected => &hooks.on_detect,
        DetectionEdge::Lost => &hooks.on_lose,
    };
    if let Some(hook) = hook {
        hook(commands, agent);
    }
}

fn fire_attack(
    commands: &mut Commands,
    agent: Entity,
    target: Option<Entity>,
    hooks: &Query<&AgentHooks>,
    events: &mut EventWriter<AttackFired>,
) {
    let Some(target) = target else {
        return;
    };

    if let Ok(AgentHooks {
        on_attack: Some(hook),
        ..
    }) = hooks.get(agent)
    {
        hook(commands, agent, target);
    }
    events.write(AttackFired { agent, target });
}

fn refresh_presentation(item: &mut AgentQueryItem<'_>) {
    let presentation = AgentPresentation {
        grounded: item.controller.grounded,
        vertical_velocity: item.controller.velocity.y,
        horizontal_speed: item.controller.horizontal_speed(),
        running: item.controller.is_running(item.config),
        attacking: item.attack.attacking,
        flinching: item.controller.is_flinching(),
        charging: item.charge.as_ref().is_some_and(|charge| charge.charging),
        charge_progress: item
            .charge
            .as_ref()
            .filter(|charge| charge.charging)
            .map_or(0.0, |charge| charge.progress()),
        tracking: item.perception.detected,
        scanning: item.path.is_scanning(),
        resting: item.path.is_resting(),
        dead: item.dead,
    };
    // без лишних change ticks
    item.presentation.set_if_neq(presentation);
}

/// System: шум в области → InvestigateScene всем агентам в радиусе
pub fn spread_disturbances(
    mut disturbances: EventReader<Disturbance>,
    agents: Query<(Entity, &Transform), (With<Agent>, Without<Dead>)>,
    mut rng: ResMut<DeterministicRng>,
    mut requests: EventWriter<AgentRequest>,
) {
    for disturbance in disturbances.read() {
        let mut listeners: Vec<_> = agents
            .iter()
            .filter(|(_, transform)| {
                transform.translation.distance(disturbance.location) <= disturbance.radius
            })
            .map(|(entity, _)| entity)
            .collect();
        listeners.sort_by_key(|entity| entity.index());

        for agent in listeners {
            let mut location = disturbance.location;
            if disturbance.uncertainty > 0.0 {
                let spread = disturbance.uncertainty;
                location.x += rng.rng.gen_range(-spread..=spread);
                location.z += rng.rng.gen_range(-spread..=spread);
            }
            requests.write(AgentRequest::InvestigateScene {
                agent,
                location,
                radius: None,
            });
        }
    }
}

/// System: запросы к агентам (расследование, принудительное обнаружение/потеря)
pub fn handle_agent_requests(
    mut commands: Commands,
    mut requests: EventReader<AgentRequest>,
    mut agents: Query<AgentQuery>,
    mut targets: TargetQuery,
    hooks: Query<&AgentHooks>,
    mut detection_events: EventWriter<DetectionChanged>,
) {
    let fallback_target = default_target(&targets);

    for request in requests.read() {
        let agent = match *request {
            AgentRequest::InvestigateScene { agent, .. }
            | AgentRequest::InvestigateFromDistance { agent, .. }
            | AgentRequest::FindTarget { agent }
            | AgentRequest::ForgetTarget { agent } => agent,
        };

        let Ok(mut item) = agents.get_mut(agent) else {
            crate::logger::log_warning(&format!("⚠️ Request for unknown agent {:?}", agent));
            continue;
        };
        if item.dead {
            continue;
        }

        let target = resolve_target(item.agent, &item.perception, fallback_target);
        let scene_radius = item.behavior.scene_radius;
        let mut parts = agent_parts(&mut item);

        let edge = match *request {
            AgentRequest::InvestigateScene {
                location, radius, ..
            } => {
                if start_investigation(&mut parts, location, radius.unwrap_or(scene_radius), false) {
                    crate::logger::log(&format!(
                        "🔎 {:?} investigating scene at {:?}",
                        agent, location
                    ));
                }
                None
            }
            AgentRequest::InvestigateFromDistance { location, .. } => {
                if start_investigation(&mut parts, location, scene_radius, true) {
                    crate::logger::log(&format!("🔭 {:?} observing {:?}", agent, location));
                }
                None
            }
            AgentRequest::FindTarget { .. } => parts.perception.force_detect(),
            AgentRequest::ForgetTarget { .. } => parts.perception.forget(),
        };

        if let Some(edge) = edge {
            handle_edge(&mut parts, edge);
            let target = parts.perception.latch_target(edge, target);
            apply_detection_edge(
                &mut commands,
                agent,
                target,
                edge,
                &mut targets,
                &hooks,
                &mut detection_events,
            );
        }
    }
}

/// System: decision tick всех агентов (Update)
pub fn run_agent_decisions(
    mut commands: Commands,
    scene: SceneQuery,
    mut agents: Query<AgentQuery>,
    mut targets: TargetQuery,
    hooks: Query<&AgentHooks>,
    mut detection_events: EventWriter<DetectionChanged>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();
    let fallback_target = default_target(&targets);

    for mut item in agents.iter_mut() {
        let agent = item.entity;
        let dead = item.dead;
        let target = resolve_target(item.agent, &item.perception, fallback_target);
        let snapshot = target.and_then(|entity| snapshot_target(&targets, entity));

        let report = {
            let mut parts = agent_parts(&mut item);
            decide(&mut parts, snapshot.as_ref(), &scene, dead, delta)
        };

        if let Some(edge) = report.edge {
            let target = item.perception.latch_target(edge, target);
            apply_detection_edge(
                &mut commands,
                agent,
                target,
                edge,
                &mut targets,
                &hooks,
                &mut detection_events,
            );
        }

        refresh_presentation(&mut item);
    }
}

/// System: motion tick всех агентов (FixedUpdate)
pub fn run_agent_motion(
    mut commands: Commands,
    scene: SceneQuery,
    mut agents: Query<AgentQuery>,
    targets: TargetQuery,
    hooks: Query<&AgentHooks>,
    mut attack_events: EventWriter<AttackFired>,
    mut path_events: EventWriter<PathProgressed>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    let fallback_target = default_target(&targets);

    for mut item in agents.iter_mut() {
        let agent = item.entity;
        let dead = item.dead;
        let target = resolve_target(item.agent, &item.perception, fallback_target);
        let snapshot = target.and_then(|entity| snapshot_target(&targets, entity));

        let report = {
            let mut parts = agent_parts(&mut item);
            act(&mut parts, snapshot.as_ref(), &scene, dead, delta)
        };

        if report.attack_fired {
            crate::logger::log(&format!("🗡️ {:?} attacks {:?}", agent, target));
            fire_attack(&mut commands, agent, target, &hooks, &mut attack_events);
        }
        if let Some(event) = report.path_event {
            path_events.write(PathProgressed { agent, event });
        }
    }
}

/// System: приземление агента → on_land hook; при attack_on_land и отслеживании — атака
pub fn react_to_landing(
    mut commands: Commands,
    mut landed_events: EventReader<AgentLanded>,
    mut agents: Query<(&Agent, &AgentBehavior, &Perception, &mut AttackTimer), Without<Dead>>,
    targets: TargetQuery,
    hooks: Query<&AgentHooks>,
    mut attack_events: EventWriter<AttackFired>,
) {
    let fallback_target = default_target(&targets);

    for landed in landed_events.read() {
        let Ok((agent, behavior, perception, mut attack)) = agents.get_mut(landed.entity) else {
            continue;
        };

        if let Ok(AgentHooks {
            on_land: Some(hook),
            ..
        }) = hooks.get(landed.entity)
        {
            hook(&mut commands, landed.entity);
        }

        if behavior.attack_on_land && perception.detected && attack.try_attack() {
            let target = resolve_target(agent, perception, fallback_target);
            crate::logger::log(&format!("💥 {:?} lands on {:?}", landed.entity, target));
            fire_attack(&mut commands, landed.entity, target, &hooks, &mut attack_events);
        }
    }
}
