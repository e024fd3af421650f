//! Rapier bridge: backend переключается, тела/коллайдеры навешиваются автоматически,
//! raycast спавн цветов и сбор через CollisionEvent

mod common;

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, RigidBody, Sensor};
use bumble_simulation::spawn::flowers::spawn_flower;
use bumble_simulation::spawn::SpawnPhase;
use bumble_simulation::*;
use common::{record_events, recorded, spawn_bee, spawn_meadow};

fn create_rapier_app(config: GameConfig) -> App {
    let mut app = create_headless_app_with_config(config);
    app.add_plugins(RapierBridgePlugin);
    app
}

fn flower_positions(app: &mut App) -> Vec<Vec3> {
    let world = app.world_mut();
    world
        .query_filtered::<&Transform, With<Collectible>>()
        .iter(world)
        .map(|transform| transform.translation)
        .collect()
}

#[test]
fn test_bridge_attaches_bodies_and_colliders() {
    let mut app = create_headless_app(42);
    app.add_plugins(RapierBridgePlugin);

    assert_eq!(
        *app.world().resource::<PhysicsBackend>(),
        PhysicsBackend::Rapier
    );

    let meadow = spawn_meadow(&mut app);
    let bee = spawn_bee(&mut app, Vec3::new(0.0, 20.0, 0.0));

    run_fixed_ticks(&mut app, 3);

    let world = app.world();
    assert!(matches!(
        world.get::<RigidBody>(bee),
        Some(RigidBody::KinematicVelocityBased)
    ));
    assert!(world.get::<Collider>(bee).is_some());
    assert!(world.get::<Sensor>(bee).is_some());

    assert!(matches!(world.get::<RigidBody>(meadow), Some(RigidBody::Fixed)));
    assert!(world.get::<Collider>(meadow).is_some());
    assert!(world.get::<Sensor>(meadow).is_none());
}

#[test]
fn test_rapier_small_flower_count_fills_meadow() {
    let mut config = GameConfig::default();
    config.flowers.total_flowers = 5;
    let mut app = create_rapier_app(config);
    record_events::<SpawnFinished>(&mut app);

    spawn_meadow(&mut app);
    let rock = GroundSurface::new("Rock_Cliff", Vec3::new(40.0, 20.0, 40.0));
    let rock_bounds = rock.bounds(Vec3::new(200.0, 20.0, 200.0));
    app.world_mut()
        .spawn((rock, Transform::from_xyz(200.0, 20.0, 200.0)));

    // Spawn запрошен до того, как поверхности попали в Rapier
    app.world_mut().resource_mut::<FlowerSpawner>().request();
    run_fixed_ticks(&mut app, 30);

    let spawner = app.world().resource::<FlowerSpawner>();
    assert_eq!(spawner.phase(), SpawnPhase::Finished);
    let progress = spawner.progress();
    assert_eq!(progress.placed, 5);
    assert!(
        progress.attempts < progress.max_attempts,
        "Попытки потрачены впустую: {:?}",
        progress
    );

    let positions = flower_positions(&mut app);
    assert_eq!(positions.len(), 5);
    for position in positions {
        assert!((-250.0..=250.0).contains(&position.x), "x = {}", position.x);
        assert!((-250.0..=250.0).contains(&position.z), "z = {}", position.z);
        // Луг: верхняя грань y = 0, offset 0.1
        assert!((position.y - 0.1).abs() < 1e-3, "y = {}", position.y);
        assert!(!rock_bounds.contains_xz(position), "Цветок на камне: {:?}", position);
    }

    let finished = recorded::<SpawnFinished>(&app);
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].placed, 5);
}

#[test]
fn test_rapier_default_flower_count_wastes_no_attempts() {
    let mut app = create_rapier_app(GameConfig::default());
    spawn_meadow(&mut app);
    app.world_mut().resource_mut::<FlowerSpawner>().request();

    run_fixed_ticks(&mut app, 30);

    // Луг без препятствий: каждая попытка успешна
    let progress = app.world().resource::<FlowerSpawner>().progress();
    assert_eq!(progress.placed, 50);
    assert_eq!(progress.attempts, 50);
}

#[test]
fn test_rapier_bee_collects_flower_through_collision_event() {
    let mut app = create_rapier_app(GameConfig::default());
    record_events::<ContactBegan>(&mut app);
    record_events::<HoneyCounterUpdated>(&mut app);

    let bee = spawn_bee(&mut app, Vec3::new(0.0, 20.0, 0.0));
    let flower = {
        let config = app.world().resource::<GameConfig>().flowers.clone();
        let world = app.world_mut();
        let flower = {
            let mut commands = world.commands();
            spawn_flower(&mut commands, Vec3::new(0.0, 20.0, 15.0), 0.0, 0, &config)
        };
        world.flush();
        flower
    };
    app.world_mut()
        .resource_mut::<HoneyProgress>()
        .set_total_flowers(2);
    app.world_mut().entity_mut(bee).insert(FlightInput {
        throttle: 1.0,
        ..FlightInput::default()
    });

    run_fixed_ticks(&mut app, 120);

    // Velocity дошла до Rapier: kinematic тело сдвинулось вперёд (+Z)
    let position = app.world().get::<Transform>(bee).expect("bee alive").translation;
    assert!(position.z > 10.0, "z = {}", position.z);

    let contacts = recorded::<ContactBegan>(&app);
    assert!(contacts
        .iter()
        .any(|contact| contact.other(bee) == Some(flower)));

    assert_eq!(app.world().resource::<HoneyProgress>().honey(), 1);
    assert!(app.world().get_entity(flower).is_err());
    assert_eq!(
        recorded::<HoneyCounterUpdated>(&app).last(),
        Some(&HoneyCounterUpdated { current: 1, total: 2 })
    );
}
