//! Пассажиры платформ
//!
//! Персонаж, встающий на платформу, записывается в её список пассажиров,
//! сходя — удаляется. Сам перенос пассажиров делает внешний контроллер платформы.

use bevy::prelude::*;

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PlatformPassengers {
    passengers: Vec<Entity>,
}

impl PlatformPassengers {
    /// Повторное добавление игнорируется
    pub fn add(&mut self, passenger: Entity) -> bool {
        if self.passengers.contains(&passenger) {
            return false;
        }
        self.passengers.push(passenger);
        true
    }

    pub fn remove(&mut self, passenger: Entity) -> bool {
        let before = self.passengers.len();
        self.passengers.retain(|p| *p != passenger);
        before != self.passengers.len()
    }

    pub fn contains(&self, passenger: Entity) -> bool {
        self.passengers.contains(&passenger)
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.passengers.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_duplicate_passengers() {
        let mut platform = PlatformPassengers::default();
        let rider = Entity::from_raw(7);

        assert!(platform.add(rider));
        assert!(!platform.add(rider));
        assert_eq!(platform.len(), 1);

        assert!(platform.remove(rider));
        assert!(!platform.remove(rider));
        assert!(platform.is_empty());
    }
}
