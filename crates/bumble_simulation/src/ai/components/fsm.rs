//! FSM AI components (wasp state) + чистая логика переходов.

use bevy::prelude::*;
use crate::components::SpawnAnchor;
use crate::config::WaspConfig;
use crate::DeterministicRng;

/// Состояние осы (Roam ↔ Chase, терминального нет)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum WaspState {
    /// Патруль вокруг spawn anchor
    Roam {
        /// Текущая roam цель
        goal: Vec3,
        /// Секунд до принудительной смены цели
        timer: f32,
    },

    /// Преследование цели
    Chase {
        target: Entity,
    },
}

impl Default for WaspState {
    /// timer = 0 → goal сгенерируется на первом же step
    fn default() -> Self {
        Self::Roam {
            goal: Vec3::ZERO,
            timer: 0.0,
        }
    }
}

impl WaspState {
    pub fn is_chasing(&self) -> bool {
        matches!(self, WaspState::Chase { .. })
    }

    /// Новый Roam со свежей целью
    pub fn roam(anchor: &SpawnAnchor, config: &WaspConfig, rng: &mut DeterministicRng) -> Self {
        let (goal, timer) = roam_goal(anchor, config, rng);
        Self::Roam { goal, timer }
    }
}

/// Решение FSM на один step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaspTransition {
    Stay,
    StartChase(Entity),
    /// Chase → Roam (с регенерацией цели)
    StopChase,
}

/// Переход по дистанции до цели
///
/// `target` - (entity, distance) если цель существует.
pub fn next_transition(
    state: &WaspState,
    target: Option<(Entity, f32)>,
    aggro_range: f32,
) -> WaspTransition {
    match (state, target) {
        (WaspState::Roam { .. }, Some((entity, distance))) if distance <= aggro_range => {
            WaspTransition::StartChase(entity)
        }
        (WaspState::Roam { .. }, _) => WaspTransition::Stay,
        (WaspState::Chase { .. }, Some((_, distance))) if distance <= aggro_range => {
            WaspTransition::Stay
        }
        (WaspState::Chase { .. }, _) => WaspTransition::StopChase,
    }
}

/// Двухуровневая скорость преследования
///
/// Вплотную (≤ attack_range) - chase_speed, иначе patrol_speed.
pub fn chase_speed(distance: f32, config: &WaspConfig) -> f32 {
    if distance <= config.attack_range {
        config.chase_speed
    } else {
        config.patrol_speed
    }
}

/// Roam цель: anchor + uniform offset, Y не ниже min_roam_altitude
///
/// Возвращает (goal, timer).
pub fn roam_goal(anchor: &SpawnAnchor, config: &WaspConfig, rng: &mut DeterministicRng) -> (Vec3, f32) {
    let radius = anchor.roam_radius;
    let offset = Vec3::new(
        rng.uniform(-radius, radius),
        rng.uniform(-config.roam_vertical_range, config.roam_vertical_range),
        rng.uniform(-radius, radius),
    );

    let mut goal = anchor.point + offset;
    goal.y = goal.y.max(config.min_roam_altitude);

    let timer = rng.uniform(config.roam_timer_min, config.roam_timer_max);
    (goal, timer)
}
