//! Headless симуляция BUMBLE
//!
//! Собирает тестовый уровень (луг + камень), спавнит пчелу, запускает оба spawner'а
//! и гоняет N fixed steps без рендера.

use bevy::prelude::*;
use clap::Parser;
use std::path::PathBuf;

use bumble_simulation::{
    create_headless_app_with_config, log_error, log_info, request_level_spawn, run_fixed_ticks,
    set_log_level, spawn_player, Collectible, ConfigError, FlightInput, GameConfig, GroundSurface,
    HoneyProgress, LogLevel, SimulationTick, WaspState,
};

#[derive(Parser, Debug)]
#[command(name = "bumble_simulation", about = "Headless BUMBLE simulation")]
struct Args {
    /// Seed детерминистичного RNG (перекрывает config)
    #[arg(long)]
    seed: Option<u64>,

    /// Сколько fixed steps прогнать
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// JSON конфиг уровня
    #[arg(long)]
    config: Option<PathBuf>,

    /// Минимальный уровень лога (debug, info, warning, error)
    #[arg(long, default_value = "info")]
    log_level: LogLevel,
}

fn load_config(args: &Args) -> Result<GameConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => GameConfig::from_path(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), ConfigError> {
    let args = Args::parse();
    bumble_simulation::init_logger();
    set_log_level(args.log_level);

    let config = load_config(&args).inspect_err(|error| {
        log_error(&format!("Invalid config: {}", error));
    })?;

    log_info(&format!(
        "Starting BUMBLE headless simulation (seed: {}, ticks: {})",
        config.seed, args.ticks
    ));

    let flight = config.flight.clone();
    let mut app = create_headless_app_with_config(config);

    {
        let world = app.world_mut();
        world.spawn((
            GroundSurface::new("Grass_Meadow", Vec3::new(300.0, 1.0, 300.0)),
            Transform::from_xyz(0.0, -1.0, 0.0),
        ));
        world.spawn((
            GroundSurface::new("Rock_Cliff", Vec3::new(40.0, 20.0, 40.0)),
            Transform::from_xyz(200.0, 20.0, 200.0),
        ));

        // Пчела летит по кругу (mock input)
        {
            let mut commands = world.commands();
            let bee = spawn_player(&mut commands, Vec3::new(0.0, 20.0, 0.0), 0.0, &flight);
            commands.entity(bee).insert(FlightInput {
                turn: 0.2,
                throttle: 1.0,
                ..FlightInput::default()
            });
        }
        world.flush();

        request_level_spawn(world);
    }

    let report_every = 100;
    let mut done = 0;
    while done < args.ticks {
        let chunk = report_every.min(args.ticks - done);
        run_fixed_ticks(&mut app, chunk);
        done += chunk;

        let world = app.world_mut();
        let tick = world.resource::<SimulationTick>().0;
        let honey = world.resource::<HoneyProgress>();
        let (current, total) = (honey.honey(), honey.total_flowers());
        let flowers = world.query::<&Collectible>().iter(world).count();
        let chasing = world
            .query::<&WaspState>()
            .iter(world)
            .filter(|state| state.is_chasing())
            .count();

        log_info(&format!(
            "Tick {}: honey {}/{}, {} flowers left, {} wasps chasing",
            tick, current, total, flowers, chasing
        ));
    }

    log_info("Simulation complete!");
    Ok(())
}
