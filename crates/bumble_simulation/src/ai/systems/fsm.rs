//! FSM AI systems (state transitions по дистанции до цели).

use bevy::prelude::*;
use crate::ai::{next_transition, WaspState, WaspTransition};
use crate::components::{Agent, ChaseTarget, SpawnAnchor};
use crate::config::WaspConfig;
use crate::DeterministicRng;

/// Anchor осы: SpawnAnchor, иначе текущая позиция + roam_radius из конфига
pub(crate) fn effective_anchor(
    anchor: Option<&SpawnAnchor>,
    transform: &Transform,
    config: &WaspConfig,
) -> SpawnAnchor {
    anchor.copied().unwrap_or(SpawnAnchor {
        point: transform.translation,
        roam_radius: config.roam_radius,
    })
}

/// Система: wasp FSM transitions
///
/// Roam → Chase: цель существует и distance ≤ aggro_range.
/// Chase → Roam: цель пропала или ушла за aggro_range (новая roam цель).
pub fn wasp_fsm_transitions(
    mut wasps: Query<(
        Entity,
        &mut WaspState,
        &Transform,
        &ChaseTarget,
        &WaspConfig,
        Option<&SpawnAnchor>,
    )>,
    targets: Query<&Transform, (With<Agent>, Without<WaspState>)>,
    mut rng: ResMut<DeterministicRng>,
) {
    for (entity, mut state, transform, chase_target, config, anchor) in wasps.iter_mut() {
        let target = chase_target.0.and_then(|target| {
            targets
                .get(target)
                .ok()
                .map(|target_transform| {
                    (target, transform.translation.distance(target_transform.translation))
                })
        });

        match next_transition(&state, target, config.aggro_range) {
            WaspTransition::Stay => {}
            WaspTransition::StartChase(target) => {
                crate::log(&format!("🐝 Wasp {:?} Roam → Chase (target {:?})", entity, target));
                *state = WaspState::Chase { target };
            }
            WaspTransition::StopChase => {
                crate::log(&format!("Wasp {:?} Chase → Roam", entity));
                let anchor = effective_anchor(anchor, transform, config);
                *state = WaspState::roam(&anchor, config, &mut rng);
            }
        }
    }
}
