//! World компоненты: поверхности земли, collectibles, spawn anchor

use bevy::prelude::*;

/// Axis-aligned box (bounds поверхностей и spawn регионов)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct BoxBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoxBounds {
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half_extents = half_extents.abs();
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Объединение двух box (encapsulate)
    pub fn union(&self, other: &BoxBounds) -> BoxBounds {
        BoxBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Сжать по X и Z на `buffer` с каждой стороны
    ///
    /// Если buffer больше половины размера - box схлопывается в центр по этой оси.
    pub fn shrink_horizontal(&self, buffer: f32) -> BoxBounds {
        let center = self.center();
        let half = self.size() * 0.5;
        let half_x = (half.x - buffer).max(0.0);
        let half_z = (half.z - buffer).max(0.0);

        BoxBounds {
            min: Vec3::new(center.x - half_x, self.min.y, center.z - half_z),
            max: Vec3::new(center.x + half_x, self.max.y, center.z + half_z),
        }
    }

    /// Попадает ли (x, z) в горизонтальную проекцию (границы включительно)
    pub fn contains_xz(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.z >= self.min.z && point.z <= self.max.z
    }
}

/// Поверхность земли (landscape collider)
///
/// Box с центром в Transform.translation. Верхняя грань - то, во что попадает вертикальный probe.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct GroundSurface {
    /// Имя для фильтра ("Grass_01", "Lawn", "Rock" ...)
    pub name: String,
    pub half_extents: Vec3,
}

impl GroundSurface {
    pub fn new(name: impl Into<String>, half_extents: Vec3) -> Self {
        Self {
            name: name.into(),
            half_extents,
        }
    }

    pub fn bounds(&self, center: Vec3) -> BoxBounds {
        BoxBounds::from_center_half_extents(center, self.half_extents)
    }
}

/// Цветок (collectible) - даёт honey при первом валидном контакте
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct Collectible {
    pub honey: u32,
}

/// Точка спавна осы + радиус roam (генерация RoamGoal)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct SpawnAnchor {
    pub point: Vec3,
    pub roam_radius: f32,
}

/// Цель преследования осы (None → оса только патрулирует)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ChaseTarget(pub Option<Entity>);
