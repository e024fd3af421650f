//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - agent: агенты (Agent, PhysicsBody, Player marker, контактные сенсоры)
//! - world: мир (GroundSurface, Collectible, SpawnAnchor, ChaseTarget, BoxBounds)
//!
//! Steering (Heading, SteeringState) живёт в `crate::steering`,
//! AI состояние осы - в `crate::ai`.

pub mod agent;
pub mod world;

// Re-exports для удобного импорта
pub use agent::*;
pub use world::*;
