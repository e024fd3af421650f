//! Базовые компоненты агентов: Agent, PhysicsBody, контактные сенсоры

use bevy::prelude::*;
use crate::steering::{Heading, SteeringState};

/// Роль агента (пчела игрока или оса)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum AgentRole {
    #[default]
    Player,
    Enemy,
}

/// Агент - любой подвижный entity симуляции
///
/// Автоматически добавляет Transform, Heading, SteeringState, PhysicsBody через Required Components.
/// "Уничтожен" = despawn, отдельного Dead состояния нет.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Transform, Heading, SteeringState, PhysicsBody)]
pub struct Agent {
    pub role: AgentRole,
}

impl Agent {
    pub fn player() -> Self {
        Self { role: AgentRole::Player }
    }

    pub fn enemy() -> Self {
        Self { role: AgentRole::Enemy }
    }
}

/// Velocity агента (пишет controller, применяет physics bridge)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec3,
}

/// Marker component для player-controlled entity
///
/// AI systems используют `Without<Player>`, input systems - `With<Player>`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Категория участника контакта (аналог tag'ов в движке)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub enum ContactCategory {
    Player,
    Enemy,
    Collectible,
    Projectile,
}

/// Сферический контактный сенсор (headless contact detection)
///
/// Контакт начинается когда distance ≤ radius_a + radius_b.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ContactSensor {
    pub radius: f32,
}

impl ContactSensor {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub fn overlaps(&self, position: Vec3, other: &ContactSensor, other_position: Vec3) -> bool {
        position.distance(other_position) <= self.radius + other.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_overlap_is_inclusive() {
        let a = ContactSensor::new(2.5);
        let b = ContactSensor::new(1.0);

        assert!(a.overlaps(Vec3::ZERO, &b, Vec3::new(3.5, 0.0, 0.0)));
        assert!(!a.overlaps(Vec3::ZERO, &b, Vec3::new(3.6, 0.0, 0.0)));
    }

    #[test]
    fn test_agent_role_constructors() {
        assert_eq!(Agent::player().role, AgentRole::Player);
        assert_eq!(Agent::enemy().role, AgentRole::Enemy);
    }
}
