//! BUMBLE Simulation Core
//!
//! ECS-симуляция аркады на Bevy 0.16: пчела собирает мёд, осы патрулируют и преследуют.
//!
//! Порядок одного fixed step (60Hz), см. `SimulationSet`:
//! Spawn → Steering → Integrate → Contacts → Resolve
//!
//! Рендер и UI живут снаружи crate, общаемся через events.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod components;
pub mod config;
pub mod lifecycle;
pub mod logger;
pub mod physics;
pub mod player;
pub mod progress;
pub mod spawn;
pub mod steering;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, WaspState};
pub use components::*;
pub use config::{ConfigError, GameConfig};
pub use lifecycle::{GameOverShown, LevelReloadRequested, LifecyclePlugin, RestartCountdownChanged};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, ConsoleLogger,
    LogLevel, LogPrinter,
};
pub use physics::{ContactBegan, PhysicsBackend, PhysicsPlugin, RapierBridgePlugin};
pub use player::{spawn_player, FlightController, FlightInput, PlayerGameOver, PlayerPlugin};
pub use progress::{HoneyCounterUpdated, HoneyProgress, ProgressPlugin, VictoryReached};
pub use spawn::{FlowerSpawner, SpawnFinished, SpawnKind, SpawnPlugin, WaspSpawner};
pub use steering::{Heading, SteeringState};

/// Частота simulation tick
pub const FIXED_HZ: f64 = 60.0;

/// Длительность одного fixed step
pub fn fixed_step() -> Duration {
    Duration::from_secs_f64(1.0 / FIXED_HZ)
}

/// Фазы fixed step (выполняются строго по порядку)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Step-budgeted spawn задачи
    Spawn,
    /// Controller пчелы + AI ос → velocity
    Steering,
    /// velocity → position (headless или Rapier)
    Integrate,
    /// ContactBegan events
    Contacts,
    /// Сбор цветов, game over, смерть ос
    Resolve,
}

/// Номер fixed step с начала run
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationTick(pub u64);

fn advance_simulation_tick(mut tick: ResMut<SimulationTick>) {
    tick.0 += 1;
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<GameConfig>() {
            app.insert_resource(GameConfig::default());
        }
        if !app.world().contains_resource::<DeterministicRng>() {
            let seed = app.world().resource::<GameConfig>().seed;
            app.insert_resource(DeterministicRng::new(seed));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(FIXED_HZ))
            .init_resource::<SimulationTick>()
            .register_type::<GameConfig>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Spawn,
                    SimulationSet::Steering,
                    SimulationSet::Integrate,
                    SimulationSet::Contacts,
                    SimulationSet::Resolve,
                )
                    .chain(),
            )
            .add_systems(FixedFirst, advance_simulation_tick)
            // Подсистемы
            .add_plugins((
                PhysicsPlugin,
                PlayerPlugin,
                AIPlugin,
                SpawnPlugin,
                ProgressPlugin,
                LifecyclePlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Uniform в [min, max]; вырожденный/перевёрнутый диапазон → min
    pub fn uniform(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..=max)
        } else {
            min
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Один `app.update()` = ровно один fixed step (ManualDuration = fixed timestep),
/// первый update только инициализирует время.
pub fn create_headless_app(seed: u64) -> App {
    create_headless_app_with_config(GameConfig {
        seed,
        ..GameConfig::default()
    })
}

/// Headless app с заданной конфигурацией (seed берётся из config)
pub fn create_headless_app_with_config(config: GameConfig) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(fixed_step()))
        .insert_resource(DeterministicRng::new(config.seed))
        .insert_resource(config)
        .add_plugins(SimulationPlugin);

    app
}

/// Прогоняет app пока не пройдёт `ticks` fixed steps
///
/// Virtual time может быть замедлен (game over), поэтому update'ов бывает больше.
pub fn run_fixed_ticks(app: &mut App, ticks: u64) {
    let target = app.world().resource::<SimulationTick>().0 + ticks;
    let max_updates = ticks.saturating_mul(8).saturating_add(8);

    for _ in 0..max_updates {
        if app.world().resource::<SimulationTick>().0 >= target {
            return;
        }
        app.update();
    }
}

/// Запрашивает оба spawner'а уровня (стартуют на ближайшем fixed step)
pub fn request_level_spawn(world: &mut World) {
    world.resource_mut::<FlowerSpawner>().request();
    world.resource_mut::<WaspSpawner>().request();
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_degenerate_range() {
        let mut rng = DeterministicRng::new(1);
        assert_eq!(rng.uniform(5.0, 5.0), 5.0);
        assert_eq!(rng.uniform(5.0, 1.0), 5.0);

        for _ in 0..100 {
            let value = rng.uniform(-2.0, 3.0);
            assert!((-2.0..=3.0).contains(&value));
        }
    }

    #[test]
    fn test_headless_app_runs_one_tick_per_update() {
        let mut app = create_headless_app(42);
        app.update();
        let start = app.world().resource::<SimulationTick>().0;

        for _ in 0..10 {
            app.update();
        }
        assert_eq!(app.world().resource::<SimulationTick>().0, start + 10);
    }

    #[test]
    fn test_run_fixed_ticks_counts_fixed_steps() {
        let mut app = create_headless_app(42);
        run_fixed_ticks(&mut app, 30);
        assert_eq!(app.world().resource::<SimulationTick>().0, 30);
    }
}
