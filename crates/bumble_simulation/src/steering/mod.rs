//! Steering model - общая математика движения для пчелы и ос
//!
//! Агент хранит только:
//! - `Heading` (yaw, неограниченное накопление)
//! - `SteeringState` (forward speed + vertical speed)
//!
//! Каждый step скорости сдвигаются к target не больше чем на rate × dt (без overshoot),
//! velocity = forward(yaw) × speed + up × vertical_speed.
//! Никакого скрытого состояния: одинаковые входы → одинаковый результат.

use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

/// Сдвиг `current` к `target` максимум на `max_delta` (clamp на target)
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

/// Rate для forward оси: разгоняемся если |target| > |current|, иначе тормозим
pub fn forward_rate(current: f32, target: f32, acceleration: f32, deceleration: f32) -> f32 {
    if target.abs() > current.abs() {
        acceleration
    } else {
        deceleration
    }
}

/// Кратчайший знаковый угол в [-PI, PI)
pub fn shortest_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Yaw, при котором forward смотрит вдоль горизонтальной проекции `direction`
pub fn yaw_of(direction: Vec3) -> f32 {
    f32::atan2(-direction.x, -direction.z)
}

/// Ориентация агента (только yaw - pitch/roll заморожены)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Heading {
    /// Радианы, накапливается без wrap
    pub yaw: f32,
}

impl Heading {
    pub fn new(yaw: f32) -> Self {
        Self { yaw }
    }

    /// yaw += turn_input × turn_rate × dt
    pub fn turn(&mut self, turn_input: f32, turn_rate: f32, dt: f32) {
        self.yaw += turn_input * turn_rate * dt;
    }

    /// Поворот к направлению не быстрее turn_rate (AI steering)
    ///
    /// Нулевое (или чисто вертикальное) направление → yaw не трогаем.
    /// Возвращает true если поворот применён.
    pub fn turn_towards(&mut self, direction: Vec3, turn_rate: f32, dt: f32) -> bool {
        let flat = Vec3::new(direction.x, 0.0, direction.z);
        let max_step = turn_rate * dt;
        if flat.length_squared() <= f32::EPSILON || max_step <= 0.0 {
            return false;
        }

        let delta = shortest_angle(yaw_of(flat) - self.yaw);
        let turn_input = (delta / max_step).clamp(-1.0, 1.0);
        self.turn(turn_input, turn_rate, dt);
        true
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Forward вектор (Bevy convention: -Z при yaw = 0)
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    /// Для UI/debug: градусы в [0, 360)
    pub fn display_degrees(&self) -> f32 {
        self.yaw.to_degrees().rem_euclid(360.0)
    }
}

/// Текущие скорости агента (принадлежат только ему)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct SteeringState {
    pub speed: f32,
    pub vertical_speed: f32,
}

/// Цели на один step: target скорости + rate для каждой оси
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedTargets {
    pub speed: f32,
    pub speed_rate: f32,
    pub vertical_speed: f32,
    pub vertical_rate: f32,
}

impl SpeedTargets {
    /// Brake override: target = 0 с повышенным rate (до общей clamp математики)
    pub fn braking(self, brake_rate: f32) -> Self {
        Self {
            speed: 0.0,
            speed_rate: brake_rate,
            ..self
        }
    }
}

impl SteeringState {
    /// Один step: обе оси независимо, каждая со своим rate
    pub fn approach(&mut self, targets: SpeedTargets, dt: f32) {
        self.speed = move_towards(self.speed, targets.speed, targets.speed_rate * dt);
        self.vertical_speed = move_towards(
            self.vertical_speed,
            targets.vertical_speed,
            targets.vertical_rate * dt,
        );
    }

    pub fn velocity(&self, forward: Vec3) -> Vec3 {
        forward * self.speed + Vec3::Y * self.vertical_speed
    }
}

/// Разложение желаемого 3D направления на (forward speed, vertical speed)
///
/// Горизонтальная часть идёт в forward ось (после поворота yaw),
/// вертикальная - в vertical ось. Итоговая |velocity| ≈ speed когда yaw довернулся.
pub fn split_direction(direction: Vec3, speed: f32) -> (f32, f32) {
    let direction = direction.normalize_or_zero();
    let horizontal = Vec2::new(direction.x, direction.z).length();
    (horizontal * speed, direction.y * speed)
}
