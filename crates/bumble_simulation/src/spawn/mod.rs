//! Процедурные spawner'ы уровня
//!
//! - `flowers`: surface-seeking (probe вниз на валидные поверхности)
//! - `wasps`: volume-constrained (box + минимальная дистанция до пчелы)
//!
//! Оба - step-budgeted задачи: за fixed step не больше N размещений и M попыток,
//! resume point = счётчик попыток. Нехватка мест не фатальна (log + SpawnFinished).

use bevy::prelude::*;
use crate::config::SpawnBudget;
use crate::SimulationSet;

pub mod flowers;
pub mod probe;
pub mod region;
pub mod wasps;

pub use flowers::{begin_flower_spawn, step_flower_spawner, FlowerSpawnContext, FlowerSpawner};
pub use probe::{GroundProbe, ProbeHit, SurfaceProbe};
pub use region::{SurfaceCandidate, SurfaceRegion};
pub use wasps::{begin_wasp_spawn, spawn_wasp, step_wasp_spawner, WaspSpawner};

/// Фаза spawn задачи
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum SpawnPhase {
    /// Задача не запрошена
    #[default]
    Idle,
    /// Запрошена, стартует на ближайшем step
    Pending,
    Running,
    Finished,
}

/// Какой spawner отчитался
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum SpawnKind {
    Flowers,
    Wasps,
}

/// Прогресс spawn задачи (resume point = attempts)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct SpawnProgress {
    pub requested: u32,
    pub placed: u32,
    pub attempts: u32,
    pub max_attempts: u32,
}

impl SpawnProgress {
    /// Attempt cap = requested × attempts_per_target
    pub fn new(requested: u32, attempts_per_target: u32) -> Self {
        Self {
            requested,
            placed: 0,
            attempts: 0,
            max_attempts: requested.saturating_mul(attempts_per_target),
        }
    }

    pub fn is_done(&self) -> bool {
        self.placed >= self.requested || self.attempts >= self.max_attempts
    }

    pub fn shortfall(&self) -> u32 {
        self.requested.saturating_sub(self.placed)
    }
}

/// Event: spawn задача завершена (с фактическим количеством)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnFinished {
    pub kind: SpawnKind,
    pub requested: u32,
    pub placed: u32,
    pub attempts: u32,
}

impl SpawnFinished {
    pub fn new(kind: SpawnKind, progress: &SpawnProgress) -> Self {
        Self {
            kind,
            requested: progress.requested,
            placed: progress.placed,
            attempts: progress.attempts,
        }
    }
}

/// Один step spawn задачи в пределах budget
///
/// `attempt` - одна попытка размещения (true = размещено).
/// Возвращает true если задача завершена.
pub fn run_budgeted(
    progress: &mut SpawnProgress,
    budget: SpawnBudget,
    mut attempt: impl FnMut(u32) -> bool,
) -> bool {
    let mut placed_this_step = 0;
    let mut attempts_this_step = 0;

    while !progress.is_done()
        && placed_this_step < budget.placements_per_step
        && attempts_this_step < budget.attempts_per_step
    {
        progress.attempts += 1;
        attempts_this_step += 1;

        if attempt(progress.placed) {
            progress.placed += 1;
            placed_this_step += 1;
        }
    }

    progress.is_done()
}

/// Plugin spawner'ов (headless probe)
///
/// Rapier вариант flower step регистрирует `physics::RapierBridgePlugin`.
pub struct SpawnPlugin;

impl Plugin for SpawnPlugin {
    fn build(&self, app: &mut App) {
        use crate::physics::PhysicsBackend;

        app.init_resource::<FlowerSpawner>()
            .init_resource::<WaspSpawner>()
            .add_event::<SpawnFinished>()
            .add_systems(
                FixedUpdate,
                (
                    begin_flower_spawn,
                    step_flower_spawner.run_if(resource_equals(PhysicsBackend::Headless)),
                    begin_wasp_spawn,
                    step_wasp_spawner,
                )
                    .chain()
                    .in_set(SimulationSet::Spawn),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_budget_limits_placements_per_step() {
        let mut progress = SpawnProgress::new(50, 10);
        let budget = SpawnBudget::default();

        let done = run_budgeted(&mut progress, budget, |_| true);
        assert!(!done);
        assert_eq!(progress.placed, 5);
        assert_eq!(progress.attempts, 5);
    }

    #[test]
    fn test_budget_limits_attempts_per_step() {
        let mut progress = SpawnProgress::new(50, 10);
        let budget = SpawnBudget::default();

        run_budgeted(&mut progress, budget, |_| false);
        assert_eq!(progress.placed, 0);
        assert_eq!(progress.attempts, 50);

        // Resume: следующий step продолжает счётчик попыток
        run_budgeted(&mut progress, budget, |_| false);
        assert_eq!(progress.attempts, 100);
    }

    #[test]
    fn test_attempt_cap_finishes_with_shortfall() {
        let mut progress = SpawnProgress::new(3, 10);
        let budget = SpawnBudget {
            placements_per_step: 5,
            attempts_per_step: 100,
        };

        let done = run_budgeted(&mut progress, budget, |_| false);
        assert!(done);
        assert_eq!(progress.attempts, 30);
        assert_eq!(progress.shortfall(), 3);
    }

    #[test]
    fn test_zero_requested_is_done_immediately() {
        let mut progress = SpawnProgress::new(0, 10);
        assert!(run_budgeted(&mut progress, SpawnBudget::default(), |_| true));
        assert_eq!(progress.attempts, 0);
    }

    proptest! {
        #[test]
        fn prop_never_places_more_than_requested(
            requested in 0u32..40,
            per_target in 1u32..12,
            accept_every in 1u32..5,
        ) {
            let mut progress = SpawnProgress::new(requested, per_target);
            let budget = SpawnBudget::default();
            let mut counter = 0u32;

            let mut steps = 0;
            while !run_budgeted(&mut progress, budget, |_| {
                counter += 1;
                counter % accept_every == 0
            }) {
                steps += 1;
                prop_assert!(steps < 10_000);
            }

            prop_assert!(progress.placed <= requested);
            prop_assert!(progress.attempts <= progress.max_attempts);
        }
    }
}
