//! Вертикальный probe поверхности (raycast вниз)
//!
//! `SurfaceProbe` - seam между spawner'ом и physics backend'ом:
//! - `GroundProbe` - headless, по box'ам GroundSurface
//! - `physics::rapier::RapierProbe` - через RapierContext::cast_ray

use bevy::prelude::*;
use crate::components::{BoxBounds, GroundSurface};

/// Попадание probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    /// Entity поверхности (collider)
    pub surface: Entity,
    pub point: Vec3,
    pub distance: f32,
}

/// Probe вниз по -Y от `origin` не дальше `max_distance`
pub trait SurfaceProbe {
    fn probe_down(&self, origin: Vec3, max_distance: f32) -> Option<ProbeHit>;
}

/// Headless probe: верхние грани GroundSurface box'ов
#[derive(Debug, Clone, Default)]
pub struct GroundProbe {
    surfaces: Vec<(Entity, BoxBounds)>,
}

impl GroundProbe {
    pub fn new(surfaces: impl IntoIterator<Item = (Entity, BoxBounds)>) -> Self {
        let mut surfaces: Vec<_> = surfaces.into_iter().collect();
        surfaces.sort_by_key(|(entity, _)| *entity);
        Self { surfaces }
    }

    pub fn from_surfaces<'a>(
        surfaces: impl IntoIterator<Item = (Entity, &'a GroundSurface, &'a Transform)>,
    ) -> Self {
        Self::new(
            surfaces
                .into_iter()
                .map(|(entity, surface, transform)| (entity, surface.bounds(transform.translation))),
        )
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl SurfaceProbe for GroundProbe {
    /// Ближайшая верхняя грань под origin (первое попадание луча)
    fn probe_down(&self, origin: Vec3, max_distance: f32) -> Option<ProbeHit> {
        let mut best: Option<ProbeHit> = None;

        for (entity, bounds) in &self.surfaces {
            if !bounds.contains_xz(origin) {
                continue;
            }

            let top = bounds.max.y;
            if top > origin.y {
                continue;
            }

            let distance = origin.y - top;
            if distance > max_distance {
                continue;
            }

            if best.is_none_or(|hit| distance < hit.distance) {
                best = Some(ProbeHit {
                    surface: *entity,
                    point: Vec3::new(origin.x, top, origin.z),
                    distance,
                });
            }
        }

        best
    }
}
