//! Профили агентов (TOML)
//!
//! AgentProfile = movement + perception + combat + behavior + path.
//! Все секции опциональны, отсутствующие поля берутся из Default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::{AgentBehavior, ChaseStyle};
use crate::combat::{AttackTimer, ChargeAttack, Health, MeleeStrike};
use crate::locomotion::MovementConfig;
use crate::path::PathConfig;
use crate::perception::PerceptionConfig;

mod error;
pub mod presets;

pub use error::ConfigError;

/// Боевые параметры профиля
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub attack_cooldown: f32,
    pub attack_range: f32,
    /// Есть — атака с зарядкой
    pub charge: Option<ChargeAttack>,
    pub strike: MeleeStrike,
    pub health: f32,
    pub void_time: f32,
    /// None — тело не исчезает
    pub decay_time: Option<f32>,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_cooldown: 1.5,
            attack_range: 1.2,
            charge: None,
            strike: MeleeStrike::default(),
            health: 100.0,
            void_time: 2.0,
            decay_time: Some(7.0),
        }
    }
}

impl CombatConfig {
    pub fn attack_timer(&self) -> AttackTimer {
        AttackTimer::new(self.attack_cooldown, self.attack_range)
    }

    pub fn health(&self) -> Health {
        Health {
            void_time: self.void_time,
            decay_time: self.decay_time,
            ..Health::new(self.health)
        }
    }
}

/// Полный профиль агента
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProfile {
    pub name: String,
    pub movement: MovementConfig,
    pub perception: PerceptionConfig,
    pub combat: CombatConfig,
    pub behavior: AgentBehavior,
    pub path: Option<PathConfig>,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            name: "agent".to_string(),
            movement: MovementConfig::default(),
            perception: PerceptionConfig::default(),
            combat: CombatConfig::default(),
            behavior: AgentBehavior::default(),
            path: None,
        }
    }
}

impl AgentProfile {
    /// Разбор + валидация
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let profile: AgentProfile = toml::from_str(contents)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Загрузка из файла; пустое имя в файле → имя файла
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut profile = Self::from_toml_str(&contents)?;

        if profile.name.is_empty() {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                profile.name = stem.to_string();
            }
        }

        crate::logger::log_info(&format!("📄 Loaded agent profile '{}' from {:?}", profile.name, path));
        Ok(profile)
    }

    pub fn with_path(mut self, path: PathConfig) -> Self {
        self.path = Some(path);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let movement = &self.movement;
        non_negative("movement.walk_speed", movement.walk_speed)?;
        non_negative("movement.run_speed", movement.run_speed)?;
        positive("movement.rotate_speed", movement.rotate_speed)?;
        non_negative("movement.jump_force", movement.jump_force)?;
        non_negative("movement.jump_cooldown", movement.jump_cooldown)?;
        non_negative("movement.flinch_time", movement.flinch_time)?;
        positive("movement.acceleration", movement.acceleration)?;

        let perception = &self.perception;
        fov("perception.fov", perception.fov)?;
        if let Some(tracking_fov) = perception.tracking_fov {
            fov("perception.tracking_fov", tracking_fov)?;
        }
        non_negative("perception.sight_radius", perception.sight_radius)?;
        positive("perception.search_time", perception.search_time)?;

        let combat = &self.combat;
        non_negative("combat.attack_cooldown", combat.attack_cooldown)?;
        non_negative("combat.attack_range", combat.attack_range)?;
        positive("combat.health", combat.health)?;
        positive("combat.void_time", combat.void_time)?;
        if let Some(decay) = combat.decay_time {
            non_negative("combat.decay_time", decay)?;
        }
        if let Some(charge) = &combat.charge {
            positive("combat.charge.charge_time", charge.charge_time)?;
            positive("combat.charge.radius", charge.radius)?;
        }

        positive("behavior.observation_time", self.behavior.observation_time)?;
        if let Some(range) = self.behavior.obstacle_sensor {
            positive("behavior.obstacle_sensor", range)?;
        }
        if matches!(self.behavior.chase, ChaseStyle::Charge { .. }) && combat.charge.is_none() {
            crate::logger::log_warning(&format!(
                "⚠️ Profile '{}' uses charge chase without [combat.charge], falling back to direct chase",
                self.name
            ));
        }

        let mut path = self.path.as_ref();
        while let Some(config) = path {
            positive("path.rest_time", config.rest_time)?;
            positive("path.look_time", config.look_time)?;
            positive("path.spin_time", config.spin_time)?;
            path = config.next.as_deref();
        }

        Ok(())
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("expected >= 0, got {}", value)))
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("expected > 0, got {}", value)))
    }
}

fn fov(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 360.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("expected (0, 360], got {}", value)))
    }
}
