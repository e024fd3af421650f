//! Surface-seeking spawner (цветы)
//!
//! Старт: цель прогресса = requested, выбор поверхностей, общий bounds.
//! Каждый step: случайная (x, z) в bounds → probe вниз → валидная поверхность
//! и высота в [min, max] → цветок на hit + offset со случайным yaw.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use std::f32::consts::TAU;

use crate::components::{Collectible, ContactCategory, ContactSensor, GroundSurface};
use crate::config::{FlowerSpawnConfig, GameConfig};
use crate::progress::{publish_outcome, HoneyCounterUpdated, HoneyProgress, VictoryReached};
use crate::DeterministicRng;
use super::probe::{GroundProbe, SurfaceProbe};
use super::region::{SurfaceCandidate, SurfaceRegion};
use super::{run_budgeted, SpawnFinished, SpawnKind, SpawnPhase, SpawnProgress};

/// Задача спавна цветов (resource, живёт весь run)
#[derive(Resource, Debug, Clone, Default)]
pub struct FlowerSpawner {
    phase: SpawnPhase,
    progress: SpawnProgress,
    region: Option<SurfaceRegion>,
}

impl FlowerSpawner {
    /// Запросить спавн (стартует на ближайшем fixed step)
    pub fn request(&mut self) {
        self.phase = SpawnPhase::Pending;
    }

    pub fn phase(&self) -> SpawnPhase {
        self.phase
    }

    pub fn progress(&self) -> SpawnProgress {
        self.progress
    }

    pub fn region(&self) -> Option<&SurfaceRegion> {
        self.region.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.phase == SpawnPhase::Running
    }
}

/// Общие параметры flower step (headless и Rapier probe)
#[derive(SystemParam)]
pub struct FlowerSpawnContext<'w, 's> {
    spawner: ResMut<'w, FlowerSpawner>,
    config: Res<'w, GameConfig>,
    rng: ResMut<'w, DeterministicRng>,
    progress: ResMut<'w, HoneyProgress>,
    commands: Commands<'w, 's>,
    counter: EventWriter<'w, HoneyCounterUpdated>,
    victory: EventWriter<'w, VictoryReached>,
    finished: EventWriter<'w, SpawnFinished>,
}

impl FlowerSpawnContext<'_, '_> {
    pub fn is_running(&self) -> bool {
        self.spawner.is_running()
    }

    pub fn region(&self) -> Option<&SurfaceRegion> {
        self.spawner.region()
    }

    /// Один budgeted step с заданным probe
    pub fn advance(&mut self, probe: &impl SurfaceProbe) {
        if !self.spawner.is_running() {
            return;
        }

        let config = &self.config.flowers;
        let rng = &mut *self.rng;
        let commands = &mut self.commands;
        let spawner = &mut *self.spawner;

        let Some(region) = spawner.region.as_ref() else {
            spawner.phase = SpawnPhase::Finished;
            return;
        };

        let done = run_budgeted(&mut spawner.progress, config.budget, |index| {
            try_place_flower(index, region, config, probe, rng, commands)
        });

        if !done {
            return;
        }

        spawner.phase = SpawnPhase::Finished;
        let progress = spawner.progress;
        report_finished(SpawnKind::Flowers, &progress, "flowers");
        self.finished.write(SpawnFinished::new(SpawnKind::Flowers, &progress));

        if config.reconcile_target_to_spawned {
            if let Some(outcome) = self.progress.reconcile_total(progress.placed) {
                crate::log(&format!("Honey target reconciled to {} flowers", progress.placed));
                publish_outcome(outcome, &mut self.counter, &mut self.victory);
            }
        }
    }
}

/// Лог итогов spawn задачи (shortfall - warning, не ошибка)
pub(crate) fn report_finished(kind: SpawnKind, progress: &SpawnProgress, noun: &str) {
    crate::log_info(&format!(
        "🌱 Spawned {}/{} {} ({:?}, {} attempts)",
        progress.placed, progress.requested, noun, kind, progress.attempts
    ));
    if progress.shortfall() > 0 {
        crate::log_warning(&format!(
            "Spawn shortfall: {} {} not placed after {} attempts",
            progress.shortfall(),
            noun,
            progress.attempts
        ));
    }
}

/// Одна попытка: сэмпл (x, z) → probe → проверка → spawn
fn try_place_flower(
    index: u32,
    region: &SurfaceRegion,
    config: &FlowerSpawnConfig,
    probe: &impl SurfaceProbe,
    rng: &mut DeterministicRng,
    commands: &mut Commands,
) -> bool {
    let bounds = region.bounds;
    let x = rng.uniform(bounds.min.x, bounds.max.x);
    let z = rng.uniform(bounds.min.z, bounds.max.z);
    let origin = Vec3::new(x, config.probe_altitude, z);

    let Some(hit) = probe.probe_down(origin, config.probe_distance) else {
        return false;
    };

    if !region.contains_surface(hit.surface) {
        return false;
    }

    if hit.point.y < config.min_altitude || hit.point.y > config.max_altitude {
        return false;
    }

    let yaw = rng.uniform(0.0, TAU);
    spawn_flower(commands, hit.point + Vec3::Y * config.surface_offset, yaw, index, config);
    true
}

/// Spawn helper для цветка
pub fn spawn_flower(
    commands: &mut Commands,
    position: Vec3,
    yaw: f32,
    index: u32,
    config: &FlowerSpawnConfig,
) -> Entity {
    commands
        .spawn((
            Name::new(format!("Flower_{}", index + 1)),
            Collectible {
                honey: config.honey_per_flower,
            },
            Transform::from_translation(position).with_rotation(Quat::from_rotation_y(yaw)),
            ContactSensor::new(config.contact_radius),
            ContactCategory::Collectible,
        ))
        .id()
}

/// Система: старт flower задачи (Pending → Running/Finished)
///
/// Цель прогресса ставится ДО любого размещения.
/// Нет поверхностей → warning, задача завершается с 0 размещений.
pub fn begin_flower_spawn(
    mut spawner: ResMut<FlowerSpawner>,
    config: Res<GameConfig>,
    surfaces: Query<(Entity, &GroundSurface, &Transform)>,
    mut progress: ResMut<HoneyProgress>,
    mut counter: EventWriter<HoneyCounterUpdated>,
    mut finished: EventWriter<SpawnFinished>,
) {
    if spawner.phase != SpawnPhase::Pending {
        return;
    }

    let flowers = &config.flowers;
    counter.write(progress.set_total_flowers(flowers.total_flowers));

    let candidates: Vec<SurfaceCandidate> = surfaces
        .iter()
        .map(|(entity, surface, transform)| SurfaceCandidate {
            entity,
            name: surface.name.clone(),
            bounds: surface.bounds(transform.translation),
        })
        .collect();

    spawner.progress = SpawnProgress::new(flowers.total_flowers, flowers.attempts_per_target);
    spawner.region = SurfaceRegion::select(
        &candidates,
        &flowers.surface_keywords,
        flowers.min_surface_size,
        flowers.edge_buffer,
    );

    match spawner.region.as_ref().map(SurfaceRegion::surface_count) {
        Some(surface_count) => {
            crate::log(&format!(
                "Flower spawn started: {} flowers over {} surfaces",
                flowers.total_flowers, surface_count
            ));
            spawner.phase = SpawnPhase::Running;
        }
        None => {
            crate::log_warning("No valid ground surfaces found: skipping flower spawn");
            spawner.phase = SpawnPhase::Finished;
            finished.write(SpawnFinished::new(SpawnKind::Flowers, &spawner.progress));
        }
    }
}

/// Система: flower step с headless probe (GroundSurface box'ы)
pub fn step_flower_spawner(
    mut context: FlowerSpawnContext,
    surfaces: Query<(Entity, &GroundSurface, &Transform)>,
) {
    if !context.is_running() {
        return;
    }

    let probe = GroundProbe::from_surfaces(surfaces.iter());
    context.advance(&probe);
}
