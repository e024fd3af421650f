//! Spawn region для цветов: выбор поверхностей + общий bounds

use bevy::prelude::*;
use crate::components::BoxBounds;

/// Поверхность-кандидат (entity, имя, bounds)
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceCandidate {
    pub entity: Entity,
    pub name: String,
    pub bounds: BoxBounds,
}

/// Выбранные поверхности + сжатый bounds для сэмплинга (x, z)
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceRegion {
    surfaces: Vec<Entity>,
    pub bounds: BoxBounds,
}

impl SurfaceRegion {
    /// Фильтр по имени (lowercase contains keyword), fallback - все поверхности
    /// с диагональю bounds больше `min_surface_size`.
    ///
    /// None если подходящих поверхностей нет.
    pub fn select(
        candidates: &[SurfaceCandidate],
        keywords: &[String],
        min_surface_size: f32,
        edge_buffer: f32,
    ) -> Option<SurfaceRegion> {
        let named: Vec<&SurfaceCandidate> = candidates
            .iter()
            .filter(|candidate| {
                let name = candidate.name.to_lowercase();
                keywords
                    .iter()
                    .any(|keyword| name.contains(&keyword.to_lowercase()))
            })
            .collect();

        let selected: Vec<&SurfaceCandidate> = if named.is_empty() {
            candidates
                .iter()
                .filter(|candidate| candidate.bounds.size().length() > min_surface_size)
                .collect()
        } else {
            named
        };

        let (first, rest) = selected.split_first()?;
        let merged = rest
            .iter()
            .fold(first.bounds, |acc, candidate| acc.union(&candidate.bounds));

        let mut surfaces: Vec<Entity> = selected.iter().map(|candidate| candidate.entity).collect();
        surfaces.sort();

        Some(SurfaceRegion {
            surfaces,
            bounds: merged.shrink_horizontal(edge_buffer),
        })
    }

    pub fn contains_surface(&self, entity: Entity) -> bool {
        self.surfaces.binary_search(&entity).is_ok()
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Выбранные поверхности (отсортированы по Entity)
    pub fn surfaces(&self) -> &[Entity] {
        &self.surfaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Vec<String> {
        vec!["grass".to_string(), "lawn".to_string(), "field".to_string()]
    }

    fn candidate(index: u32, name: &str, center: Vec3, half: Vec3) -> SurfaceCandidate {
        SurfaceCandidate {
            entity: Entity::from_raw(index),
            name: name.to_string(),
            bounds: BoxBounds::from_center_half_extents(center, half),
        }
    }

    #[test]
    fn test_name_filter_is_case_insensitive() {
        let candidates = vec![
            candidate(1, "Grass_North", Vec3::ZERO, Vec3::new(100.0, 1.0, 100.0)),
            candidate(2, "Rock", Vec3::new(500.0, 0.0, 0.0), Vec3::new(100.0, 1.0, 100.0)),
            candidate(3, "SunnyFIELD", Vec3::new(200.0, 0.0, 0.0), Vec3::new(100.0, 1.0, 100.0)),
        ];

        let region = SurfaceRegion::select(&candidates, &keywords(), 1.0, 50.0).expect("region");
        assert_eq!(region.surface_count(), 2);
        assert!(region.contains_surface(Entity::from_raw(1)));
        assert!(!region.contains_surface(Entity::from_raw(2)));

        // Union: x ∈ [-100, 300] → после buffer 50: [-50, 250]
        assert_eq!(region.bounds.min.x, -50.0);
        assert_eq!(region.bounds.max.x, 250.0);
        assert_eq!(region.bounds.min.z, -50.0);
    }

    #[test]
    fn test_fallback_uses_large_surfaces() {
        let candidates = vec![
            candidate(1, "Terrain", Vec3::ZERO, Vec3::new(100.0, 1.0, 100.0)),
            candidate(2, "Pebble", Vec3::ZERO, Vec3::splat(0.1)),
        ];

        let region = SurfaceRegion::select(&candidates, &keywords(), 1.0, 0.0).expect("fallback");
        assert!(region.contains_surface(Entity::from_raw(1)));
        assert!(!region.contains_surface(Entity::from_raw(2)));
    }

    #[test]
    fn test_no_surfaces_no_region() {
        assert!(SurfaceRegion::select(&[], &keywords(), 1.0, 50.0).is_none());

        let tiny = vec![candidate(1, "Pebble", Vec3::ZERO, Vec3::splat(0.1))];
        assert!(SurfaceRegion::select(&tiny, &keywords(), 1.0, 50.0).is_none());
    }
}
