//! Общие helpers для integration тестов

#![allow(dead_code)]

use bevy::prelude::*;
use bumble_simulation::*;

/// Все события типа E, прочитанные за время теста
#[derive(Resource)]
pub struct EventLog<E: Event + Clone>(pub Vec<E>);

impl<E: Event + Clone> Default for EventLog<E> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

fn record<E: Event + Clone>(mut reader: EventReader<E>, mut log: ResMut<EventLog<E>>) {
    log.0.extend(reader.read().cloned());
}

/// Подписать recorder (Last: видит и FixedUpdate, и Update события этого кадра)
pub fn record_events<E: Event + Clone>(app: &mut App) {
    app.init_resource::<EventLog<E>>()
        .add_systems(Last, record::<E>);
}

pub fn recorded<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world().resource::<EventLog<E>>().0.clone()
}

/// Луг (верхняя грань на y = 0), 600×600
pub fn spawn_meadow(app: &mut App) -> Entity {
    app.world_mut()
        .spawn((
            GroundSurface::new("Grass_Meadow", Vec3::new(300.0, 1.0, 300.0)),
            Transform::from_xyz(0.0, -1.0, 0.0),
        ))
        .id()
}

/// Пчела через Commands + flush
pub fn spawn_bee(app: &mut App, position: Vec3) -> Entity {
    let config = app.world().resource::<GameConfig>().flight.clone();
    let world = app.world_mut();
    let bee = {
        let mut commands = world.commands();
        spawn_player(&mut commands, position, 0.0, &config)
    };
    world.flush();
    bee
}

/// Оса с заданной целью
pub fn spawn_test_wasp(app: &mut App, position: Vec3, target: Option<Entity>) -> Entity {
    let config = app.world().resource::<GameConfig>().wasp.clone();
    let world = app.world_mut();
    let wasp = {
        let mut commands = world.commands();
        bumble_simulation::spawn::spawn_wasp(&mut commands, position, config.roam_radius, target, 0, &config)
    };
    world.flush();
    wasp
}
