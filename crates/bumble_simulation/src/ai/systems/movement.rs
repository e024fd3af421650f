//! AI movement systems.

use bevy::prelude::*;
use crate::ai::{chase_speed, roam_goal, WaspState};
use crate::components::{Agent, PhysicsBody, SpawnAnchor};
use crate::config::WaspConfig;
use crate::steering::{split_direction, Heading, SpeedTargets, SteeringState};
use crate::DeterministicRng;
use super::fsm::effective_anchor;

/// Один steering step осы к направлению `direction` со скоростью `speed`
///
/// Нулевое направление → None (velocity не трогаем).
pub fn steer_wasp(
    direction: Vec3,
    speed: f32,
    config: &WaspConfig,
    heading: &mut Heading,
    state: &mut SteeringState,
    dt: f32,
) -> Option<Vec3> {
    if direction.length_squared() <= f32::EPSILON {
        return None;
    }

    heading.turn_towards(direction, config.rotation_speed_degrees.to_radians(), dt);

    let (forward_speed, vertical_speed) = split_direction(direction, speed);
    state.approach(
        SpeedTargets {
            speed: forward_speed,
            speed_rate: config.acceleration,
            vertical_speed,
            vertical_rate: config.acceleration,
        },
        dt,
    );

    Some(state.velocity(heading.forward()))
}

/// Система: wasp movement from state
///
/// Roam: таймер ↓, цель достигнута/истекла → новая цель и пропуск движения на этот step.
/// Chase: летим к цели (скорость по chase tier).
pub fn wasp_movement_from_state(
    mut wasps: Query<(
        &mut WaspState,
        &mut Heading,
        &mut SteeringState,
        &mut PhysicsBody,
        &mut Transform,
        &WaspConfig,
        Option<&SpawnAnchor>,
    )>,
    targets: Query<&Transform, (With<Agent>, Without<WaspState>)>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (mut state, mut heading, mut steering, mut body, mut transform, config, anchor) in
        wasps.iter_mut()
    {
        let position = transform.translation;
        let current = *state;

        let desired = match current {
            WaspState::Roam { goal, timer } => {
                let timer = timer - delta;
                if position.distance(goal) < config.goal_reached_distance || timer <= 0.0 {
                    let anchor = effective_anchor(anchor, &transform, config);
                    let (goal, timer) = roam_goal(&anchor, config, &mut rng);
                    *state = WaspState::Roam { goal, timer };
                    continue;
                }
                *state = WaspState::Roam { goal, timer };
                (goal - position, config.patrol_speed * config.patrol_speed_factor)
            }
            WaspState::Chase { target } => {
                let Ok(target_transform) = targets.get(target) else {
                    // Цель пропала - FSM переведёт в Roam на следующем step
                    continue;
                };
                let offset = target_transform.translation - position;
                (offset, chase_speed(offset.length(), config))
            }
        };

        let (direction, speed) = desired;
        if let Some(velocity) = steer_wasp(direction, speed, config, &mut heading, &mut steering, delta) {
            body.velocity = velocity;
            transform.rotation = heading.rotation();
        }
    }
}
