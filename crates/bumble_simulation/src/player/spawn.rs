//! Spawn helper для пчелы игрока

use bevy::prelude::*;
use crate::components::{Agent, ContactCategory, ContactSensor, Player};
use crate::config::FlightConfig;
use crate::steering::Heading;
use super::{AnimationRate, FlightController, FlightInput};

/// Создаёт entity пчелы с полным набором компонентов:
/// - Agent (→ Transform, Heading, SteeringState, PhysicsBody)
/// - Player marker + FlightInput/FlightController/FlightConfig
/// - AnimationRate hint
/// - Collector сенсор (ContactSensor + ContactCategory::Player)
pub fn spawn_player(commands: &mut Commands, position: Vec3, yaw: f32, config: &FlightConfig) -> Entity {
    commands
        .spawn((
            Name::new("Bee"),
            Agent::player(),
            Player,
            Transform::from_translation(position).with_rotation(Quat::from_rotation_y(yaw)),
            Heading::new(yaw),
            FlightInput::default(),
            FlightController::default(),
            config.clone(),
            AnimationRate::default(),
            ContactSensor::new(config.contact_radius),
            ContactCategory::Player,
        ))
        .id()
}
