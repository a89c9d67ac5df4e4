//! Agent components — состояние и настройки orchestrator'а

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::AttackHook;
use crate::locomotion::ExternalClock;

/// NPC агент
///
/// `target` — явная цель; None → первая DetectionTarget в мире.
/// Jump/stagger таймеры агента крутит decision tick (ExternalClock).
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(ExternalClock, Investigation, AgentPresentation)]
pub struct Agent {
    pub target: Option<Entity>,
}

/// Как агент преследует обнаруженную цель
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect, Serialize, Deserialize)]
#[serde(tag = "style")]
pub enum ChaseStyle {
    /// Бежать к цели, бить в радиусе атаки
    #[default]
    Direct,
    /// Стоять и поворачиваться, бить когда цель подошла
    Stationary,
    /// Зарядка в радиусе атаки; `pursue` — догонять вне радиуса
    Charge { pursue: bool },
}

/// Настройки поведения (data-driven вместо наследования контроллеров)
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct AgentBehavior {
    /// Атаковать не сходя с маршрута (цель теряется сразу)
    pub attack_on_path: bool,
    pub chase: ChaseStyle,
    /// Прыгать, если цель в основном сверху
    pub jump_at_elevated_target: bool,
    /// |cos| направления на цель с вертикалью, начиная с которого цель "сверху"
    pub elevation_threshold: f32,
    /// Дальность луча-сенсора препятствий; None — без сенсора
    pub obstacle_sensor: Option<f32>,
    /// Приземление при отслеживании = атака
    pub attack_on_land: bool,
    /// Радиус осмотра сцены по умолчанию
    pub scene_radius: f32,
    /// Сколько стоять на месте расследования
    pub observation_time: f32,
}

impl Default for AgentBehavior {
    fn default() -> Self {
        Self {
            attack_on_path: false,
            chase: ChaseStyle::Direct,
            jump_at_elevated_target: false,
            elevation_threshold: 0.4,
            obstacle_sensor: None,
            attack_on_land: false,
            scene_radius: 4.0,
            observation_time: 2.0,
        }
    }
}

/// Расследование (сцена / наблюдение издалека)
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Investigation {
    pub active: bool,
    pub scene: Vec3,
    /// Насколько близко подойти (m)
    pub radius: f32,
    /// На месте (или наблюдение издалека)
    pub arrived: bool,
    pub elapsed: f32,
}

impl Investigation {
    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}

/// Hook агента: (commands, агент)
pub type AgentHook = Box<dyn Fn(&mut Commands, Entity) + Send + Sync>;

/// Strategy hooks конкретного типа врага
#[derive(Component, Default)]
pub struct AgentHooks {
    /// Эффект атаки (урон, снаряд, волна)
    pub on_attack: Option<AttackHook>,
    pub on_detect: Option<AgentHook>,
    pub on_lose: Option<AgentHook>,
    pub on_land: Option<AgentHook>,
}

impl AgentHooks {
    pub fn with_attack(mut self, hook: AttackHook) -> Self {
        self.on_attack = Some(hook);
        self
    }

    pub fn with_detect(mut self, hook: AgentHook) -> Self {
        self.on_detect = Some(hook);
        self
    }

    pub fn with_lose(mut self, hook: AgentHook) -> Self {
        self.on_lose = Some(hook);
        self
    }

    pub fn with_land(mut self, hook: AgentHook) -> Self {
        self.on_land = Some(hook);
        self
    }
}

/// Снимок для анимации/презентации (read-only снаружи)
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AgentPresentation {
    pub grounded: bool,
    pub vertical_velocity: f32,
    pub horizontal_speed: f32,
    pub running: bool,
    pub attacking: bool,
    pub flinching: bool,
    pub charging: bool,
    /// 0..1, 0 вне зарядки
    pub charge_progress: f32,
    pub tracking: bool,
    pub scanning: bool,
    pub resting: bool,
    pub dead: bool,
}
