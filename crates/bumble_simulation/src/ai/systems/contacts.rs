//! Разрешение контактов осы (пчела → game over, снаряд → смерть осы).

use bevy::prelude::*;
use crate::ai::WaspState;
use crate::components::{ChaseTarget, ContactCategory, PhysicsBody, Player, SpawnAnchor};
use crate::config::WaspConfig;
use crate::physics::ContactBegan;
use crate::player::{FlightController, PlayerGameOver};
use crate::DeterministicRng;
use super::fsm::effective_anchor;

/// Система: wasp contact resolution
///
/// Оса × Player: game over пчелы (один раз), despawn пчелы в конце step (Commands),
/// оса забывает цель и возвращается в Roam со свежей целью.
/// Оса × Projectile: despawn осы.
pub fn resolve_wasp_contacts(
    mut contacts: EventReader<ContactBegan>,
    mut wasps: Query<(
        &mut WaspState,
        &mut ChaseTarget,
        &Transform,
        &WaspConfig,
        Option<&SpawnAnchor>,
    )>,
    mut players: Query<(&mut FlightController, &mut PhysicsBody), With<Player>>,
    categories: Query<&ContactCategory>,
    mut rng: ResMut<DeterministicRng>,
    mut commands: Commands,
    mut game_over: EventWriter<PlayerGameOver>,
) {
    for contact in contacts.read() {
        let (wasp, other) = if wasps.contains(contact.a) {
            (contact.a, contact.b)
        } else if wasps.contains(contact.b) {
            (contact.b, contact.a)
        } else {
            continue;
        };

        let Ok(category) = categories.get(other) else {
            continue;
        };

        match category {
            ContactCategory::Player => {
                if let Ok((mut controller, mut body)) = players.get_mut(other) {
                    if controller.trigger_game_over(&mut body) {
                        crate::log(&format!("💀 Player {:?} stung by wasp {:?}: game over", other, wasp));
                        game_over.write(PlayerGameOver {
                            player: other,
                            killer: Some(wasp),
                        });
                    }
                }
                commands.entity(other).try_despawn();

                let Ok((mut state, mut chase_target, transform, config, anchor)) = wasps.get_mut(wasp)
                else {
                    continue;
                };
                chase_target.0 = None;
                let anchor = effective_anchor(anchor, transform, config);
                *state = WaspState::roam(&anchor, config, &mut rng);
            }
            ContactCategory::Projectile => {
                crate::log(&format!("Wasp {:?} hit by projectile {:?}", wasp, other));
                commands.entity(wasp).try_despawn();
            }
            ContactCategory::Enemy | ContactCategory::Collectible => {}
        }
    }
}
