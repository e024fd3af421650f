//! AI decision-making module
//!
//! Wasp FSM: Roam ↔ Chase, переходы по дистанции до ChaseTarget.
//! Контакты осы разрешаются после contact detection (SimulationSet::Resolve).

use bevy::prelude::*;
use crate::SimulationSet;

pub mod components;
pub mod systems;

// Re-export основных типов
pub use components::{chase_speed, next_transition, roam_goal, WaspState, WaspTransition};
pub use systems::{
    resolve_wasp_contacts, steer_wasp, wasp_fsm_transitions, wasp_movement_from_state,
};

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. wasp_fsm_transitions - обновление WaspState
/// 2. wasp_movement_from_state - WaspState → steering → velocity
/// 3. resolve_wasp_contacts - ContactBegan → game over / смерть осы
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<WaspState>()
            .add_systems(
                FixedUpdate,
                (wasp_fsm_transitions, wasp_movement_from_state)
                    .chain() // Последовательное выполнение для детерминизма
                    .after(crate::player::apply_flight_input)
                    .in_set(SimulationSet::Steering),
            )
            .add_systems(
                FixedUpdate,
                resolve_wasp_contacts
                    .after(crate::progress::collect_flowers)
                    .in_set(SimulationSet::Resolve),
            );
    }
}
