//! Honey progress: счётчик мёда, цель, победа
//!
//! Инварианты:
//! - honey не убывает
//! - `won` переключается false → true ровно один раз
//! - после победы collection events состояние не меняют

use bevy::prelude::*;
use std::collections::HashSet;

use crate::components::{Collectible, Player};
use crate::physics::ContactBegan;
use crate::SimulationSet;

/// Прогресс уровня (один resource на run, сбрасывается при reload)
#[derive(Resource, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct HoneyProgress {
    honey: u32,
    total_flowers: u32,
    won: bool,
}

/// Результат изменения прогресса (для UI notifications)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoneyOutcome {
    pub current: u32,
    pub total: u32,
    /// true только на вызове, который впервые достиг цели
    pub won_now: bool,
}

impl HoneyProgress {
    pub fn honey(&self) -> u32 {
        self.honey
    }

    pub fn total_flowers(&self) -> u32 {
        self.total_flowers
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Цель уровня (вызывается flower spawner'ом до первого размещения)
    pub fn set_total_flowers(&mut self, total: u32) -> HoneyCounterUpdated {
        self.total_flowers = total;
        HoneyCounterUpdated {
            current: self.honey,
            total,
        }
    }

    /// +amount мёда. После победы - no-op (None).
    pub fn add_honey(&mut self, amount: u32) -> Option<HoneyOutcome> {
        if self.won {
            return None;
        }

        self.honey = self.honey.saturating_add(amount);
        Some(self.outcome())
    }

    /// Подгонка цели под фактически размещённые цветы
    ///
    /// Победа перепроверяется только если мёд уже собирали (honey > 0).
    pub fn reconcile_total(&mut self, total: u32) -> Option<HoneyOutcome> {
        if self.won {
            return None;
        }

        self.total_flowers = total;
        if self.honey == 0 {
            return Some(HoneyOutcome {
                current: 0,
                total,
                won_now: false,
            });
        }
        Some(self.outcome())
    }

    fn outcome(&mut self) -> HoneyOutcome {
        let won_now = self.honey >= self.total_flowers;
        if won_now {
            self.won = true;
        }
        HoneyOutcome {
            current: self.honey,
            total: self.total_flowers,
            won_now,
        }
    }
}

/// UI event: обновить счётчик "current / total"
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoneyCounterUpdated {
    pub current: u32,
    pub total: u32,
}

/// Event: цель по мёду достигнута (один раз за run)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VictoryReached {
    pub honey: u32,
}

/// Отправка notifications по результату изменения прогресса
pub fn publish_outcome(
    outcome: HoneyOutcome,
    counter: &mut EventWriter<HoneyCounterUpdated>,
    victory: &mut EventWriter<VictoryReached>,
) {
    counter.write(HoneyCounterUpdated {
        current: outcome.current,
        total: outcome.total,
    });

    if outcome.won_now {
        crate::log_info(&format!("🍯 Victory! {}/{} honey", outcome.current, outcome.total));
        victory.write(VictoryReached {
            honey: outcome.current,
        });
    }
}

/// Цветы, уже засчитанные в этом run (exactly-once поверх despawn)
#[derive(Resource, Debug, Default)]
pub struct CollectedFlowers {
    collected: HashSet<Entity>,
}

impl CollectedFlowers {
    /// true если цветок засчитан впервые
    pub fn mark(&mut self, flower: Entity) -> bool {
        self.collected.insert(flower)
    }

    pub fn len(&self) -> usize {
        self.collected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collected.is_empty()
    }
}

/// Система: сбор цветов по ContactBegan (Player × Collectible)
///
/// Первый контакт выигрывает: повторные контакты с тем же цветком
/// (в том же step или до despawn) мёд не добавляют.
pub fn collect_flowers(
    mut contacts: EventReader<ContactBegan>,
    players: Query<(), With<Player>>,
    flowers: Query<&Collectible>,
    mut collected: ResMut<CollectedFlowers>,
    mut progress: ResMut<HoneyProgress>,
    mut commands: Commands,
    mut counter: EventWriter<HoneyCounterUpdated>,
    mut victory: EventWriter<VictoryReached>,
) {
    for contact in contacts.read() {
        let flower = if players.contains(contact.a) {
            contact.b
        } else if players.contains(contact.b) {
            contact.a
        } else {
            continue;
        };

        let Ok(collectible) = flowers.get(flower) else {
            continue;
        };

        if !collected.mark(flower) {
            continue;
        }

        commands.entity(flower).try_despawn();

        if let Some(outcome) = progress.add_honey(collectible.honey) {
            publish_outcome(outcome, &mut counter, &mut victory);
        }
    }
}

/// Plugin прогресса
pub struct ProgressPlugin;

impl Plugin for ProgressPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<HoneyProgress>()
            .init_resource::<HoneyProgress>()
            .init_resource::<CollectedFlowers>()
            .add_event::<HoneyCounterUpdated>()
            .add_event::<VictoryReached>()
            .add_systems(FixedUpdate, collect_flowers.in_set(SimulationSet::Resolve));
    }
}
