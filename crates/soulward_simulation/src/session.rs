//! GameSession — контекст прохождения (уровень, попытки)
//!
//! Resource вместо глобального состояния уровня. Загрузку сцен делает хост,
//! здесь только счётчики.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct GameSession {
    /// Текущий уровень, 0..level_count
    pub level: usize,
    pub level_count: usize,
    /// Перезапуски текущего уровня
    pub attempts: u32,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(1)
    }
}

impl GameSession {
    pub fn new(level_count: usize) -> Self {
        Self {
            level: 0,
            level_count: level_count.max(1),
            attempts: 0,
        }
    }

    pub fn is_final_level(&self) -> bool {
        self.level + 1 >= self.level_count
    }

    /// Следующий уровень. false — уровней больше нет (индекс не меняется).
    pub fn advance_level(&mut self) -> bool {
        if self.is_final_level() {
            crate::logger::log_info(&format!("🏁 Final level {} complete", self.level));
            return false;
        }

        self.level += 1;
        self.attempts = 0;
        crate::logger::log_info(&format!(
            "➡️ Advancing to level {}/{}",
            self.level + 1,
            self.level_count
        ));
        true
    }

    /// Перезапуск текущего уровня (смерть игрока)
    pub fn reload_level(&mut self) {
        self.attempts += 1;
        crate::logger::log_info(&format!(
            "🔄 Reloading level {} (attempt {})",
            self.level, self.attempts
        ));
    }

    /// С первого уровня
    pub fn restart(&mut self) {
        self.level = 0;
        self.attempts = 0;
        crate::logger::log_info("🔁 Session restarted");
    }
}
