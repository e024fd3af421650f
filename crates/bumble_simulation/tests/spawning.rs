//! Spawn integration: flowers на поверхностях, осы в объёме

mod common;

use bevy::prelude::*;
use bumble_simulation::spawn::SpawnPhase;
use bumble_simulation::*;
use common::{record_events, recorded, spawn_bee, spawn_meadow};

fn flower_positions(app: &mut App) -> Vec<Vec3> {
    let world = app.world_mut();
    world
        .query_filtered::<&Transform, With<Collectible>>()
        .iter(world)
        .map(|transform| transform.translation)
        .collect()
}

#[test]
fn test_flowers_land_inside_shrunk_meadow() {
    let mut app = create_headless_app(7);
    record_events::<SpawnFinished>(&mut app);

    spawn_meadow(&mut app);
    // Камень внутри луга: выше травы, но не подходит по имени
    let rock = GroundSurface::new("Rock_Cliff", Vec3::new(40.0, 20.0, 40.0));
    let rock_bounds = rock.bounds(Vec3::new(200.0, 20.0, 200.0));
    app.world_mut()
        .spawn((rock, Transform::from_xyz(200.0, 20.0, 200.0)));

    app.world_mut().resource_mut::<FlowerSpawner>().request();
    run_fixed_ticks(&mut app, 30);

    let spawner = app.world().resource::<FlowerSpawner>();
    assert_eq!(spawner.phase(), SpawnPhase::Finished);
    assert_eq!(spawner.progress().placed, 50);

    let positions = flower_positions(&mut app);
    assert_eq!(positions.len(), 50);

    for position in positions {
        // edge buffer 50 → [-250, 250]
        assert!((-250.0..=250.0).contains(&position.x), "x = {}", position.x);
        assert!((-250.0..=250.0).contains(&position.z), "z = {}", position.z);
        assert!((0.0..=150.0 + 0.1).contains(&position.y), "y = {}", position.y);
        assert!(!rock_bounds.contains_xz(position), "Цветок на камне: {:?}", position);
    }

    let finished = recorded::<SpawnFinished>(&app);
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].kind, SpawnKind::Flowers);
    assert_eq!(finished[0].placed, 50);

    let progress = app.world().resource::<HoneyProgress>();
    assert_eq!(progress.total_flowers(), 50);
    assert_eq!(progress.honey(), 0);
}

#[test]
fn test_flower_spawn_is_spread_over_steps() {
    let mut app = create_headless_app(7);
    spawn_meadow(&mut app);
    app.world_mut().resource_mut::<FlowerSpawner>().request();

    // Budget 5 размещений за step
    run_fixed_ticks(&mut app, 1);
    assert_eq!(app.world().resource::<FlowerSpawner>().progress().placed, 5);
    assert_eq!(
        app.world().resource::<FlowerSpawner>().phase(),
        SpawnPhase::Running
    );

    run_fixed_ticks(&mut app, 9);
    assert_eq!(app.world().resource::<FlowerSpawner>().progress().placed, 50);
    assert_eq!(
        app.world().resource::<FlowerSpawner>().phase(),
        SpawnPhase::Finished
    );
}

#[test]
fn test_no_surfaces_means_no_flowers() {
    let mut app = create_headless_app(7);
    record_events::<SpawnFinished>(&mut app);
    record_events::<HoneyCounterUpdated>(&mut app);

    app.world_mut().resource_mut::<FlowerSpawner>().request();
    run_fixed_ticks(&mut app, 5);

    assert_eq!(
        app.world().resource::<FlowerSpawner>().phase(),
        SpawnPhase::Finished
    );
    assert!(flower_positions(&mut app).is_empty());

    let finished = recorded::<SpawnFinished>(&app);
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].placed, 0);

    // Цель прогресса выставлена до размещения
    let counter = recorded::<HoneyCounterUpdated>(&app);
    assert_eq!(counter.first().map(|event| event.total), Some(50));
}

#[test]
fn test_only_unnamed_surfaces_use_size_fallback() {
    let mut app = create_headless_app(3);
    app.world_mut().spawn((
        GroundSurface::new("Terrain_Main", Vec3::new(300.0, 1.0, 300.0)),
        Transform::from_xyz(0.0, -1.0, 0.0),
    ));

    app.world_mut().resource_mut::<FlowerSpawner>().request();
    run_fixed_ticks(&mut app, 20);

    assert_eq!(flower_positions(&mut app).len(), 50);
}

#[test]
fn test_wasps_keep_distance_from_bee() {
    let mut app = create_headless_app(11);
    let bee_position = Vec3::new(0.0, 20.0, 0.0);
    spawn_bee(&mut app, bee_position);

    app.world_mut().resource_mut::<WaspSpawner>().request();
    run_fixed_ticks(&mut app, 10);

    let spawner = app.world().resource::<WaspSpawner>();
    assert_eq!(spawner.phase(), SpawnPhase::Finished);
    assert_eq!(spawner.progress().placed, 16);

    let world = app.world_mut();
    let anchors: Vec<SpawnAnchor> = world.query::<&SpawnAnchor>().iter(world).copied().collect();
    assert_eq!(anchors.len(), 16);

    let config = world.resource::<GameConfig>().wasps.clone();
    for anchor in anchors {
        assert!(anchor.point.distance(bee_position) >= config.min_distance_from_bee);
        assert!((10.0..=80.0).contains(&anchor.point.y));
        assert_eq!(anchor.roam_radius, config.roam_radius);
    }
}

#[test]
fn test_crowded_wasp_zone_gives_up_after_attempt_cap() {
    let mut config = GameConfig::default();
    config.wasps.area_size = [10.0, 10.0];
    config.wasps.min_spawn_height = 10.0;
    config.wasps.max_spawn_height = 20.0;

    let mut app = create_headless_app_with_config(config);
    record_events::<SpawnFinished>(&mut app);
    spawn_bee(&mut app, Vec3::new(0.0, 15.0, 0.0));

    app.world_mut().resource_mut::<WaspSpawner>().request();
    run_fixed_ticks(&mut app, 10);

    let finished = recorded::<SpawnFinished>(&app);
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].kind, SpawnKind::Wasps);
    assert_eq!(finished[0].placed, 0);
    assert_eq!(finished[0].attempts, 160);
}

#[test]
fn test_wasps_without_bee_only_roam() {
    let mut app = create_headless_app(5);
    app.world_mut().resource_mut::<WaspSpawner>().request();
    run_fixed_ticks(&mut app, 120);

    let world = app.world_mut();
    let states: Vec<WaspState> = world.query::<&WaspState>().iter(world).copied().collect();
    assert_eq!(states.len(), 16);
    assert!(states.iter().all(|state| !state.is_chasing()));

    let targets: Vec<ChaseTarget> = world.query::<&ChaseTarget>().iter(world).copied().collect();
    assert!(targets.iter().all(|target| target.0.is_none()));
}

#[test]
fn test_spawned_names_count_from_one() {
    let mut app = create_headless_app(11);
    spawn_meadow(&mut app);
    spawn_bee(&mut app, Vec3::new(0.0, 20.0, 0.0));
    request_level_spawn(app.world_mut());
    run_fixed_ticks(&mut app, 20);

    let world = app.world_mut();
    let mut wasps: Vec<String> = world
        .query_filtered::<&Name, With<SpawnAnchor>>()
        .iter(world)
        .map(|name| name.as_str().to_string())
        .collect();
    wasps.sort();
    let mut expected: Vec<String> = (1..=16).map(|n| format!("Wasp_{}", n)).collect();
    expected.sort();
    assert_eq!(wasps, expected);

    let flowers: Vec<String> = world
        .query_filtered::<&Name, With<Collectible>>()
        .iter(world)
        .map(|name| name.as_str().to_string())
        .collect();
    assert_eq!(flowers.len(), 50);
    assert!(flowers.iter().any(|name| name == "Flower_1"));
    assert!(flowers.iter().any(|name| name == "Flower_50"));
    assert!(!flowers.iter().any(|name| name == "Flower_0"));
}
