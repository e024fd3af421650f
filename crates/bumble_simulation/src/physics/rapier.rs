//! Rapier bridge (runs с настоящей физикой)
//!
//! Архитектура:
//! - Агенты - RigidBody::KinematicVelocityBased, velocity пишем сами (PhysicsBody → Velocity)
//! - ContactSensor → sensor collider, CollisionEvent::Started → ContactBegan
//! - GroundSurface → fixed cuboid collider (цель flower probe)
//! - Flower probe через RapierContext::cast_ray (sensors исключены)
//!
//! Rapier sets живут в FixedUpdate: Integrate → SyncBackend → StepSimulation → Writeback → Contacts.
//! Query pipeline обновляется внутри StepSimulation, поэтому collider поверхности виден
//! raycast'у только со следующего fixed step после attach.

use bevy::prelude::*;
use bevy_rapier3d::plugin::PhysicsSet;
use bevy_rapier3d::prelude::*;

use crate::components::{Agent, ContactSensor, GroundSurface, PhysicsBody};
use crate::spawn::{begin_flower_spawn, begin_wasp_spawn, FlowerSpawnContext, ProbeHit, SurfaceProbe};
use crate::{SimulationSet, FIXED_HZ};
use super::{ContactBegan, PhysicsBackend};

/// Probe поверхности через Rapier raycast
pub struct RapierProbe<'a, 'b> {
    context: &'a RapierContext<'b>,
}

impl<'a, 'b> RapierProbe<'a, 'b> {
    pub fn new(context: &'a RapierContext<'b>) -> Self {
        Self { context }
    }
}

impl SurfaceProbe for RapierProbe<'_, '_> {
    fn probe_down(&self, origin: Vec3, max_distance: f32) -> Option<ProbeHit> {
        let filter = QueryFilter::default().exclude_sensors();
        self.context
            .cast_ray(origin, Vec3::NEG_Y, max_distance, true, filter)
            .map(|(surface, distance)| ProbeHit {
                surface,
                point: origin + Vec3::NEG_Y * distance,
                distance,
            })
    }
}

/// Система: kinematic тело для каждого нового агента
pub fn attach_agent_bodies(mut commands: Commands, agents: Query<Entity, Added<Agent>>) {
    for entity in agents.iter() {
        commands
            .entity(entity)
            .try_insert((RigidBody::KinematicVelocityBased, Velocity::default()));
    }
}

/// Система: sensor collider для каждого нового ContactSensor
///
/// Kinematic/fixed пары по умолчанию не дают событий - включаем все типы.
pub fn attach_contact_sensors(
    mut commands: Commands,
    sensors: Query<(Entity, &ContactSensor), Added<ContactSensor>>,
) {
    for (entity, sensor) in sensors.iter() {
        commands.entity(entity).try_insert((
            Collider::ball(sensor.radius),
            Sensor,
            ActiveEvents::COLLISION_EVENTS,
            ActiveCollisionTypes::all(),
        ));
    }
}

/// Система: fixed collider для каждой новой поверхности земли
pub fn attach_ground_colliders(
    mut commands: Commands,
    surfaces: Query<(Entity, &GroundSurface), Added<GroundSurface>>,
) {
    for (entity, surface) in surfaces.iter() {
        let half = surface.half_extents.abs();
        commands
            .entity(entity)
            .try_insert((RigidBody::Fixed, Collider::cuboid(half.x, half.y, half.z)));
    }
}

/// Система синхронизации PhysicsBody.velocity → Rapier Velocity
pub fn sync_velocity_to_rapier(mut query: Query<(&PhysicsBody, &mut Velocity)>) {
    for (body, mut rapier_velocity) in query.iter_mut() {
        rapier_velocity.linvel = body.velocity;
    }
}

/// Система: CollisionEvent::Started → ContactBegan
pub fn forward_collision_events(
    mut collisions: EventReader<CollisionEvent>,
    mut contacts: EventWriter<ContactBegan>,
) {
    for event in collisions.read() {
        if let CollisionEvent::Started(a, b, _) = event {
            contacts.write(ContactBegan::new(*a, *b));
        }
    }
}

/// Все выбранные поверхности уже в Rapier (handle есть → прошёл хотя бы один step)
///
/// Удалённая поверхность не блокирует спавн.
fn region_surfaces_ready(
    surfaces: &[Entity],
    colliders: &Query<Has<RapierColliderHandle>, With<GroundSurface>>,
) -> bool {
    surfaces
        .iter()
        .all(|surface| !matches!(colliders.get(*surface), Ok(false)))
}

/// Система: flower step с Rapier probe
///
/// Пока collider'ы поверхностей не попали в query pipeline, попытки не тратятся.
pub fn step_flower_spawner_rapier(
    mut context: FlowerSpawnContext,
    rapier: ReadRapierContext,
    colliders: Query<Has<RapierColliderHandle>, With<GroundSurface>>,
) {
    if !context.is_running() {
        return;
    }

    if let Some(region) = context.region() {
        if !region_surfaces_ready(region.surfaces(), &colliders) {
            return;
        }
    }

    let Ok(rapier_context) = rapier.single() else {
        return;
    };

    context.advance(&RapierProbe::new(&rapier_context));
}

/// Plugin Rapier bridge
///
/// Переключает PhysicsBackend на Rapier: headless интеграция и sphere contacts выключаются.
/// Rapier step идёт в FixedUpdate между Integrate и Contacts, dt = fixed step.
pub struct RapierBridgePlugin;

impl Plugin for RapierBridgePlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<TransformPlugin>() {
            app.add_plugins(TransformPlugin);
        }

        app.insert_resource(PhysicsBackend::Rapier)
            .insert_resource(TimestepMode::Fixed {
                dt: (1.0 / FIXED_HZ) as f32,
                substeps: 1,
            })
            .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Integrate.before(PhysicsSet::SyncBackend),
                    SimulationSet::Contacts.after(PhysicsSet::Writeback),
                ),
            )
            .add_systems(
                FixedUpdate,
                step_flower_spawner_rapier
                    .after(begin_flower_spawn)
                    .before(begin_wasp_spawn)
                    .in_set(SimulationSet::Spawn),
            )
            .add_systems(
                FixedUpdate,
                (
                    attach_agent_bodies,
                    attach_contact_sensors,
                    attach_ground_colliders,
                    sync_velocity_to_rapier,
                )
                    .chain()
                    .in_set(SimulationSet::Integrate),
            )
            .add_systems(
                FixedUpdate,
                forward_collision_events.in_set(SimulationSet::Contacts),
            );
    }
}
