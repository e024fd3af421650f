//! Startup-time конфигурация (tunables)
//!
//! Всё здесь читается ОДИН раз при старте уровня, runtime-мутаций нет.
//! Per-agent части (`FlightConfig`, `WaspConfig`) вешаются компонентами на entity,
//! как AIConfig у NPC.
//!
//! Источник: JSON (serde_json), все поля опциональны (`#[serde(default)]`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Ошибки загрузки конфигурации (единственный fallible путь - startup бинаря)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Параметры полёта пчелы (player flyer)
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct FlightConfig {
    /// Разгон forward оси (units/sec²)
    pub acceleration: f32,
    /// Торможение forward оси + vertical ось (units/sec²)
    pub deceleration: f32,
    pub max_speed: f32,
    /// Скорость поворота (градусы/сек)
    pub turn_speed_degrees: f32,
    pub vertical_speed: f32,
    /// Модель пчелы смотрит назад → forward инвертирован
    pub invert_forward: bool,
    /// Brake: deceleration × multiplier
    pub brake_multiplier: f32,
    pub turn_dead_zone: f32,
    /// Радиус collector-сенсора (сбор цветов, контакт с осами)
    pub contact_radius: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            acceleration: 10.0,
            deceleration: 12.0,
            max_speed: 10.0,
            turn_speed_degrees: 90.0,
            vertical_speed: 5.0,
            invert_forward: true,
            brake_multiplier: 2.0,
            turn_dead_zone: 0.01,
            contact_radius: 2.5,
        }
    }
}

/// Параметры осы (roam/chase)
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct WaspConfig {
    pub patrol_speed: f32,
    pub chase_speed: f32,
    /// Скорость поворота (градусы/сек)
    pub rotation_speed_degrees: f32,
    /// Разгон/торможение обеих осей (units/sec²)
    pub acceleration: f32,
    /// Дистанция начала преследования
    pub aggro_range: f32,
    /// Внутри attack_range оса летит на chase_speed
    pub attack_range: f32,
    /// Roam radius по умолчанию (spawner перезаписывает через SpawnAnchor)
    pub roam_radius: f32,
    /// Roam offset по Y: [-range, range]
    pub roam_vertical_range: f32,
    /// Roam goal никогда не ниже этой высоты
    pub min_roam_altitude: f32,
    pub roam_timer_min: f32,
    pub roam_timer_max: f32,
    pub goal_reached_distance: f32,
    /// Roam скорость = patrol_speed × factor
    pub patrol_speed_factor: f32,
    pub contact_radius: f32,
}

impl Default for WaspConfig {
    fn default() -> Self {
        Self {
            patrol_speed: 15.0,
            chase_speed: 25.0,
            rotation_speed_degrees: 180.0,
            acceleration: 40.0,
            aggro_range: 50.0,
            attack_range: 3.0,
            roam_radius: 100.0,
            roam_vertical_range: 20.0,
            min_roam_altitude: 10.0,
            roam_timer_min: 5.0,
            roam_timer_max: 10.0,
            goal_reached_distance: 5.0,
            patrol_speed_factor: 0.7,
            contact_radius: 1.0,
        }
    }
}

/// Бюджет одного fixed step для spawn задачи
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnBudget {
    /// Сколько успешных placements за step (потом отдаём управление)
    pub placements_per_step: u32,
    /// Сколько попыток за step (даже если все неудачные)
    pub attempts_per_step: u32,
}

impl Default for SpawnBudget {
    fn default() -> Self {
        Self {
            placements_per_step: 5,
            attempts_per_step: 50,
        }
    }
}

/// Surface-seeking spawner (цветы)
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowerSpawnConfig {
    pub total_flowers: u32,
    /// Attempt cap = total × attempts_per_target
    pub attempts_per_target: u32,
    /// Отступ от края bounds (по X и Z, с каждой стороны)
    pub edge_buffer: f32,
    /// Высота старта вертикального probe
    pub probe_altitude: f32,
    pub probe_distance: f32,
    /// Допустимая высота попадания [min, max]
    pub min_altitude: f32,
    pub max_altitude: f32,
    /// Цветок ставим чуть выше точки попадания
    pub surface_offset: f32,
    /// Фильтр поверхностей по имени (lowercase contains)
    pub surface_keywords: Vec<String>,
    /// Fallback: все поверхности с диагональю bounds больше этого
    pub min_surface_size: f32,
    pub honey_per_flower: u32,
    pub contact_radius: f32,
    /// false → win target = requested count; true → после спавна target = фактический count
    pub reconcile_target_to_spawned: bool,
    pub budget: SpawnBudget,
}

impl Default for FlowerSpawnConfig {
    fn default() -> Self {
        Self {
            total_flowers: 50,
            attempts_per_target: 10,
            edge_buffer: 50.0,
            probe_altitude: 500.0,
            probe_distance: 1000.0,
            min_altitude: 0.0,
            max_altitude: 150.0,
            surface_offset: 0.1,
            surface_keywords: vec!["grass".to_string(), "lawn".to_string(), "field".to_string()],
            min_surface_size: 1.0,
            honey_per_flower: 1,
            contact_radius: 2.0,
            reconcile_target_to_spawned: false,
            budget: SpawnBudget::default(),
        }
    }
}

/// Volume-constrained spawner (осы)
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct WaspSpawnConfig {
    pub total_wasps: u32,
    pub attempts_per_target: u32,
    pub min_distance_from_bee: f32,
    /// Центр зоны спавна (позиция spawner)
    pub center: [f32; 3],
    /// Размер зоны по X и Z (полный, не half-extent)
    pub area_size: [f32; 2],
    /// Высота относительно center.y
    pub min_spawn_height: f32,
    pub max_spawn_height: f32,
    /// Roam radius, который получает каждая оса
    pub roam_radius: f32,
    pub budget: SpawnBudget,
}

impl Default for WaspSpawnConfig {
    fn default() -> Self {
        Self {
            total_wasps: 16,
            attempts_per_target: 10,
            min_distance_from_bee: 50.0,
            center: [0.0, 0.0, 0.0],
            area_size: [500.0, 500.0],
            min_spawn_height: 10.0,
            max_spawn_height: 80.0,
            roam_radius: 200.0,
            budget: SpawnBudget::default(),
        }
    }
}

/// Game over → restart flow
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Countdown до reload (секунды реального времени)
    pub restart_delay_secs: f32,
    /// Замедление virtual time во время countdown
    pub game_over_time_scale: f32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            restart_delay_secs: 3.0,
            game_over_time_scale: 0.5,
        }
    }
}

/// Корневой конфиг уровня
#[derive(Resource, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Resource)]
#[serde(default)]
pub struct GameConfig {
    pub seed: u64,
    pub flight: FlightConfig,
    pub wasp: WaspConfig,
    pub flowers: FlowerSpawnConfig,
    pub wasps: WaspSpawnConfig,
    pub lifecycle: LifecycleConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            flight: FlightConfig::default(),
            wasp: WaspConfig::default(),
            flowers: FlowerSpawnConfig::default(),
            wasps: WaspSpawnConfig::default(),
            lifecycle: LifecycleConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Семантическая проверка (serde проверяет только форму)
    pub fn validate(&self) -> Result<(), ConfigError> {
        let flight = &self.flight;
        ensure_non_negative("flight.acceleration", flight.acceleration)?;
        ensure_non_negative("flight.deceleration", flight.deceleration)?;
        ensure_non_negative("flight.vertical_speed", flight.vertical_speed)?;
        if flight.max_speed <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "flight.max_speed must be positive, got {}",
                flight.max_speed
            )));
        }

        let wasp = &self.wasp;
        ensure_non_negative("wasp.acceleration", wasp.acceleration)?;
        ensure_non_negative("wasp.aggro_range", wasp.aggro_range)?;
        if wasp.attack_range > wasp.aggro_range {
            return Err(ConfigError::Invalid(format!(
                "wasp.attack_range ({}) exceeds wasp.aggro_range ({})",
                wasp.attack_range, wasp.aggro_range
            )));
        }
        ensure_ordered("wasp.roam_timer", wasp.roam_timer_min, wasp.roam_timer_max)?;

        let flowers = &self.flowers;
        ensure_ordered("flowers.altitude", flowers.min_altitude, flowers.max_altitude)?;
        ensure_non_negative("flowers.edge_buffer", flowers.edge_buffer)?;
        ensure_budget("flowers.budget", flowers.budget)?;

        let wasps = &self.wasps;
        ensure_ordered(
            "wasps.spawn_height",
            wasps.min_spawn_height,
            wasps.max_spawn_height,
        )?;
        ensure_non_negative("wasps.min_distance_from_bee", wasps.min_distance_from_bee)?;
        ensure_budget("wasps.budget", wasps.budget)?;

        ensure_non_negative("lifecycle.restart_delay_secs", self.lifecycle.restart_delay_secs)?;
        if self.lifecycle.game_over_time_scale <= 0.0 {
            return Err(ConfigError::Invalid(
                "lifecycle.game_over_time_scale must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn ensure_non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value < 0.0 || !value.is_finite() {
        return Err(ConfigError::Invalid(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn ensure_ordered(name: &str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::Invalid(format!(
            "{}: min ({}) greater than max ({})",
            name, min, max
        )));
    }
    Ok(())
}

fn ensure_budget(name: &str, budget: SpawnBudget) -> Result<(), ConfigError> {
    if budget.placements_per_step == 0 || budget.attempts_per_step == 0 {
        return Err(ConfigError::Invalid(format!(
            "{}: per-step budget must be at least 1",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_level_tuning() {
        let config = GameConfig::default();
        assert_eq!(config.flowers.total_flowers, 50);
        assert_eq!(config.wasps.total_wasps, 16);
        assert_eq!(config.wasp.aggro_range, 50.0);
        assert_eq!(config.flight.max_speed, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json_str(r#"{ "seed": 7, "wasps": { "total_wasps": 3 } }"#)
            .expect("valid config");

        assert_eq!(config.seed, 7);
        assert_eq!(config.wasps.total_wasps, 3);
        assert_eq!(config.wasps.min_distance_from_bee, 50.0);
        assert_eq!(config.flowers, FlowerSpawnConfig::default());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = GameConfig::from_json_str("{ seed: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_inverted_spawn_heights_rejected() {
        let err = GameConfig::from_json_str(
            r#"{ "wasps": { "min_spawn_height": 90.0, "max_spawn_height": 10.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_attack_range_beyond_aggro_rejected() {
        let mut config = GameConfig::default();
        config.wasp.attack_range = 80.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_budget_rejected() {
        let mut config = GameConfig::default();
        config.flowers.budget.placements_per_step = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GameConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
