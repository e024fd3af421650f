//! Physics layer
//!
//! Два backend'а:
//! - Headless (по умолчанию): velocity интегрируем сами, контакты - сферические сенсоры
//! - Rapier (`rapier::RapierBridgePlugin`): kinematic тела, sensor collision events, raycast probe
//!
//! Оба выдают одинаковый `ContactBegan` event, gameplay не знает какой backend активен.

use bevy::prelude::*;
use std::collections::HashSet;

use crate::components::{ContactCategory, ContactSensor, PhysicsBody};
use crate::SimulationSet;

pub mod rapier;

pub use rapier::RapierBridgePlugin;

/// Активный physics backend
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhysicsBackend {
    #[default]
    Headless,
    Rapier,
}

/// Event: два контактных участника начали касаться
///
/// Пара упорядочена (a < b), одна пара = один event за всё время перекрытия.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactBegan {
    pub a: Entity,
    pub b: Entity,
}

impl ContactBegan {
    pub fn new(first: Entity, second: Entity) -> Self {
        if first <= second {
            Self { a: first, b: second }
        } else {
            Self { a: second, b: first }
        }
    }

    /// Второй участник, если `entity` - один из пары
    pub fn other(&self, entity: Entity) -> Option<Entity> {
        if self.a == entity {
            Some(self.b)
        } else if self.b == entity {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Пары, перекрытые на прошлом step (edge-triggered ContactBegan)
#[derive(Resource, Debug, Default)]
pub struct ActiveContacts {
    pairs: HashSet<(Entity, Entity)>,
}

impl ActiveContacts {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Система интеграции velocity → Transform (headless режим, без Rapier)
///
/// position += velocity × dt
pub fn integrate_velocity_to_transform(
    mut query: Query<(&PhysicsBody, &mut Transform)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (body, mut transform) in query.iter_mut() {
        transform.translation += body.velocity * delta;
    }
}

/// Headless contact detection: сферы ContactSensor
///
/// Event пишется только на переходе "не касались → касаются".
/// Пары одной категории игнорируются (оса-оса, цветок-цветок).
pub fn detect_contacts(
    sensors: Query<(Entity, &Transform, &ContactSensor, &ContactCategory)>,
    mut active: ResMut<ActiveContacts>,
    mut contacts: EventWriter<ContactBegan>,
) {
    let mut participants: Vec<_> = sensors.iter().collect();
    participants.sort_by_key(|(entity, ..)| *entity);

    let mut touching = HashSet::new();

    for (i, (entity_a, transform_a, sensor_a, category_a)) in participants.iter().enumerate() {
        for (entity_b, transform_b, sensor_b, category_b) in &participants[i + 1..] {
            if category_a == category_b {
                continue;
            }

            if !sensor_a.overlaps(transform_a.translation, sensor_b, transform_b.translation) {
                continue;
            }

            let contact = ContactBegan::new(*entity_a, *entity_b);
            let key = (contact.a, contact.b);
            if !active.pairs.contains(&key) {
                contacts.write(contact);
            }
            touching.insert(key);
        }
    }

    active.pairs = touching;
}

/// Plugin headless физики
///
/// Системы выключаются когда активен Rapier backend.
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PhysicsBackend>()
            .init_resource::<ActiveContacts>()
            .add_event::<ContactBegan>()
            .add_systems(
                FixedUpdate,
                (
                    integrate_velocity_to_transform.in_set(SimulationSet::Integrate),
                    detect_contacts.in_set(SimulationSet::Contacts),
                )
                    .run_if(resource_equals(PhysicsBackend::Headless)),
            );
    }
}
