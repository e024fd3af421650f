//! Volume-constrained spawner (осы)
//!
//! Точка = center + (U(±hx), U(min_h, max_h), U(±hz)).
//! Отказ если пчела существует и ближе min_distance_from_bee.
//! Без пчелы ограничение не проверяется, осы просто патрулируют.

use bevy::prelude::*;

use crate::ai::WaspState;
use crate::components::{Agent, ChaseTarget, ContactCategory, ContactSensor, Player, SpawnAnchor};
use crate::config::{GameConfig, WaspConfig, WaspSpawnConfig};
use crate::DeterministicRng;
use super::flowers::report_finished;
use super::{run_budgeted, SpawnFinished, SpawnKind, SpawnPhase, SpawnProgress};

/// Задача спавна ос
#[derive(Resource, Debug, Clone, Default)]
pub struct WaspSpawner {
    phase: SpawnPhase,
    progress: SpawnProgress,
}

impl WaspSpawner {
    pub fn request(&mut self) {
        self.phase = SpawnPhase::Pending;
    }

    pub fn phase(&self) -> SpawnPhase {
        self.phase
    }

    pub fn progress(&self) -> SpawnProgress {
        self.progress
    }
}

/// Сэмпл точки спавна в объёме зоны
pub fn sample_spawn_point(config: &WaspSpawnConfig, rng: &mut DeterministicRng) -> Vec3 {
    let center = Vec3::from_array(config.center);
    let half_x = config.area_size[0] * 0.5;
    let half_z = config.area_size[1] * 0.5;

    center
        + Vec3::new(
            rng.uniform(-half_x, half_x),
            rng.uniform(config.min_spawn_height, config.max_spawn_height),
            rng.uniform(-half_z, half_z),
        )
}

/// Spawn helper для осы
///
/// Anchor = точка спавна, roam radius из spawner config, chase target = пчела.
pub fn spawn_wasp(
    commands: &mut Commands,
    position: Vec3,
    roam_radius: f32,
    target: Option<Entity>,
    index: u32,
    config: &WaspConfig,
) -> Entity {
    commands
        .spawn((
            Name::new(format!("Wasp_{}", index + 1)),
            Agent::enemy(),
            Transform::from_translation(position),
            WaspState::default(),
            SpawnAnchor {
                point: position,
                roam_radius,
            },
            ChaseTarget(target),
            config.clone(),
            ContactSensor::new(config.contact_radius),
            ContactCategory::Enemy,
        ))
        .id()
}

/// Система: старт wasp задачи
pub fn begin_wasp_spawn(
    mut spawner: ResMut<WaspSpawner>,
    config: Res<GameConfig>,
    players: Query<(), With<Player>>,
) {
    if spawner.phase != SpawnPhase::Pending {
        return;
    }

    let wasps = &config.wasps;
    spawner.progress = SpawnProgress::new(wasps.total_wasps, wasps.attempts_per_target);
    spawner.phase = SpawnPhase::Running;

    if players.is_empty() {
        crate::log_warning("No player found: wasps spawn without distance check and roam freely");
    }
    crate::log(&format!("Wasp spawn started: {} wasps", wasps.total_wasps));
}

/// Система: один budgeted step wasp задачи
///
/// Позиция пчелы берётся на момент каждой попытки.
pub fn step_wasp_spawner(
    mut spawner: ResMut<WaspSpawner>,
    config: Res<GameConfig>,
    players: Query<(Entity, &Transform), With<Player>>,
    mut rng: ResMut<DeterministicRng>,
    mut commands: Commands,
    mut finished: EventWriter<SpawnFinished>,
) {
    if spawner.phase != SpawnPhase::Running {
        return;
    }

    let spawn_config = &config.wasps;
    let player = players.single().ok().map(|(entity, transform)| (entity, transform.translation));
    let rng = &mut *rng;
    let spawner = &mut *spawner;

    let done = run_budgeted(&mut spawner.progress, spawn_config.budget, |index| {
        let point = sample_spawn_point(spawn_config, rng);

        if let Some((_, player_position)) = player {
            if point.distance(player_position) < spawn_config.min_distance_from_bee {
                return false;
            }
        }

        spawn_wasp(
            &mut commands,
            point,
            spawn_config.roam_radius,
            player.map(|(entity, _)| entity),
            index,
            &config.wasp,
        );
        true
    });

    if done {
        spawner.phase = SpawnPhase::Finished;
        report_finished(SpawnKind::Wasps, &spawner.progress, "wasps");
        finished.write(SpawnFinished::new(SpawnKind::Wasps, &spawner.progress));
    }
}
