//! Flight контроллер пчелы (player agent)
//!
//! Каждый fixed step:
//! 1. FlightInput (заполняет input layer, оси уже в [-1, 1])
//! 2. Steering model → Heading + SteeringState
//! 3. PhysicsBody.velocity (применяет physics bridge)
//! 4. AnimationRate hint для renderer
//!
//! Game over - терминальное состояние: velocity = 0, input больше не обрабатывается.

use bevy::prelude::*;
use crate::components::{PhysicsBody, Player};
use crate::config::FlightConfig;
use crate::steering::{forward_rate, Heading, SpeedTargets, SteeringState};

/// Вертикальное намерение (up/down/none)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum VerticalIntent {
    Up,
    Down,
    #[default]
    None,
}

impl VerticalIntent {
    pub fn axis(self) -> f32 {
        match self {
            VerticalIntent::Up => 1.0,
            VerticalIntent::Down => -1.0,
            VerticalIntent::None => 0.0,
        }
    }
}

/// Входные данные полёта
///
/// Для headless тестов - mock input через этот компонент.
/// Контракт: turn/throttle уже clamp'нуты input layer'ом, здесь не валидируем.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct FlightInput {
    pub turn: f32,
    pub throttle: f32,
    pub vertical: VerticalIntent,
    pub brake: bool,
}

/// Состояние контроллера (terminal после game over)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct FlightController {
    game_over: bool,
}

impl FlightController {
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// One-way переход в game over
    ///
    /// Обнуляет velocity и блокирует дальнейшие steering updates.
    /// Возвращает true только при ПЕРВОМ вызове (повторные - no-op).
    pub fn trigger_game_over(&mut self, body: &mut PhysicsBody) -> bool {
        if self.game_over {
            return false;
        }
        self.game_over = true;
        body.velocity = Vec3::ZERO;
        true
    }
}

/// Animation-rate hint для renderer (крылья машут быстрее на скорости)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AnimationRate {
    pub speed_multiplier: f32,
    /// |forward speed|
    pub speed: f32,
    pub vertical_speed: f32,
}

impl Default for AnimationRate {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            speed: 0.0,
            vertical_speed: 0.0,
        }
    }
}

/// speedMultiplier = 1 + |speed| / max_speed × 1.5
pub fn speed_multiplier(speed: f32, max_speed: f32) -> f32 {
    1.0 + speed.abs() / max_speed * 1.5
}

/// Event: пчела перешла в game over (UI + lifecycle слушают)
#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerGameOver {
    pub player: Entity,
    pub killer: Option<Entity>,
}

/// Один step полёта (чистая логика, без ECS)
///
/// Возвращает новую velocity.
pub fn step_flight(
    input: &FlightInput,
    config: &FlightConfig,
    heading: &mut Heading,
    state: &mut SteeringState,
    dt: f32,
) -> Vec3 {
    // Поворот (dead zone)
    if input.turn.abs() > config.turn_dead_zone {
        heading.turn(input.turn, config.turn_speed_degrees.to_radians(), dt);
    }

    // Forward/backward
    let target_speed = input.throttle * config.max_speed;
    let mut targets = SpeedTargets {
        speed: target_speed,
        speed_rate: forward_rate(
            state.speed,
            target_speed,
            config.acceleration,
            config.deceleration,
        ),
        vertical_speed: input.vertical.axis() * config.vertical_speed,
        vertical_rate: config.deceleration,
    };

    // Brake - override до clamp математики
    if input.brake {
        targets = targets.braking(config.deceleration * config.brake_multiplier);
    }

    state.approach(targets, dt);

    let forward = if config.invert_forward {
        -heading.forward()
    } else {
        heading.forward()
    };
    state.velocity(forward)
}

/// Система применения flight input
///
/// Работает в FixedUpdate. Терминальные контроллеры пропускаются полностью.
pub fn apply_flight_input(
    mut players: Query<
        (
            &FlightInput,
            &FlightConfig,
            &FlightController,
            &mut Heading,
            &mut SteeringState,
            &mut PhysicsBody,
            &mut Transform,
            Option<&mut AnimationRate>,
        ),
        With<Player>,
    >,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (input, config, controller, mut heading, mut state, mut body, mut transform, animation) in
        players.iter_mut()
    {
        if controller.is_game_over() {
            continue;
        }

        body.velocity = step_flight(input, config, &mut heading, &mut state, delta);
        transform.rotation = heading.rotation();

        if let Some(mut animation) = animation {
            *animation = AnimationRate {
                speed_multiplier: speed_multiplier(state.speed, config.max_speed),
                speed: state.speed.abs(),
                vertical_speed: state.vertical_speed,
            };
        }
    }
}
