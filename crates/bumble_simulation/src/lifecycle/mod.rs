//! Game over → restart flow
//!
//! PlayerGameOver (первый) → GameOverShown + замедление virtual time →
//! countdown в реальном времени → LevelReloadRequested → сброс run-состояния.
//!
//! Работает в Update: countdown считается по Time<Real>, а не по fixed step
//! (virtual time во время countdown замедлен).

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::physics::ActiveContacts;
use crate::player::PlayerGameOver;
use crate::progress::{CollectedFlowers, HoneyProgress};
use crate::spawn::{FlowerSpawner, WaspSpawner};

/// UI event: показать панель game over
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverShown {
    pub final_count: u32,
    pub total: u32,
}

/// UI event: обновить текст countdown ("Restarting in N")
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartCountdownChanged {
    pub seconds_left: u32,
}

/// Level collaborator event: перезагрузить уровень
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelReloadRequested;

/// Countdown до reload (секунды реального времени)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestartCountdown {
    remaining: f32,
    shown: u32,
}

/// Результат одного tick countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountdownTick {
    /// Some - целое число секунд изменилось
    pub seconds_left: Option<u32>,
    pub finished: bool,
}

impl RestartCountdown {
    pub fn new(duration_secs: f32) -> Self {
        let remaining = duration_secs.max(0.0);
        Self {
            remaining,
            shown: remaining.ceil() as u32,
        }
    }

    pub fn seconds_left(&self) -> u32 {
        self.shown
    }

    pub fn tick(&mut self, delta_secs: f32) -> CountdownTick {
        self.remaining = (self.remaining - delta_secs).max(0.0);

        let seconds_left = self.remaining.ceil() as u32;
        let changed = seconds_left != self.shown;
        self.shown = seconds_left;

        CountdownTick {
            seconds_left: changed.then_some(seconds_left),
            finished: self.remaining <= 0.0,
        }
    }
}

/// Фаза run
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub enum LifecycleState {
    #[default]
    Playing,
    GameOver(RestartCountdown),
}

/// Система: первый PlayerGameOver → панель + countdown
pub fn show_game_over(
    mut game_over: EventReader<PlayerGameOver>,
    mut state: ResMut<LifecycleState>,
    progress: Res<HoneyProgress>,
    config: Res<GameConfig>,
    mut virtual_time: ResMut<Time<Virtual>>,
    mut shown: EventWriter<GameOverShown>,
    mut countdown_changed: EventWriter<RestartCountdownChanged>,
) {
    let Some(event) = game_over.read().last() else {
        return;
    };

    if *state != LifecycleState::Playing {
        return;
    }

    let lifecycle = &config.lifecycle;
    let countdown = RestartCountdown::new(lifecycle.restart_delay_secs);

    crate::log_info(&format!(
        "Game over (player {:?}): {}/{} honey, restarting in {}s",
        event.player,
        progress.honey(),
        progress.total_flowers(),
        countdown.seconds_left()
    ));

    shown.write(GameOverShown {
        final_count: progress.honey(),
        total: progress.total_flowers(),
    });
    countdown_changed.write(RestartCountdownChanged {
        seconds_left: countdown.seconds_left(),
    });
    virtual_time.set_relative_speed(lifecycle.game_over_time_scale);

    *state = LifecycleState::GameOver(countdown);
}

/// Система: countdown по реальному времени → LevelReloadRequested
pub fn tick_restart_countdown(
    mut state: ResMut<LifecycleState>,
    real_time: Res<Time<Real>>,
    mut virtual_time: ResMut<Time<Virtual>>,
    mut countdown_changed: EventWriter<RestartCountdownChanged>,
    mut reload: EventWriter<LevelReloadRequested>,
) {
    let LifecycleState::GameOver(mut countdown) = *state else {
        return;
    };

    let tick = countdown.tick(real_time.delta_secs());

    if let Some(seconds_left) = tick.seconds_left {
        countdown_changed.write(RestartCountdownChanged { seconds_left });
    }

    if tick.finished {
        virtual_time.set_relative_speed(1.0);
        crate::log_info("🔄 Restart countdown finished: level reload requested");
        reload.write(LevelReloadRequested);
        *state = LifecycleState::Playing;
    } else {
        *state = LifecycleState::GameOver(countdown);
    }
}

/// Run-scoped resources: живут дольше уровня, на reload сбрасываются
#[derive(bevy::ecs::system::SystemParam)]
pub struct RunResources<'w> {
    state: ResMut<'w, LifecycleState>,
    progress: ResMut<'w, HoneyProgress>,
    collected: ResMut<'w, CollectedFlowers>,
    contacts: ResMut<'w, ActiveContacts>,
    flowers: ResMut<'w, FlowerSpawner>,
    wasps: ResMut<'w, WaspSpawner>,
}

impl RunResources<'_> {
    /// Всё обратно в default (entities уровня пересоздаёт level collaborator)
    pub fn reset(&mut self) {
        *self.state = LifecycleState::Playing;
        *self.progress = HoneyProgress::default();
        *self.collected = CollectedFlowers::default();
        *self.contacts = ActiveContacts::default();
        *self.flowers = FlowerSpawner::default();
        *self.wasps = WaspSpawner::default();
    }
}

/// Система: LevelReloadRequested → сброс run-состояния
///
/// Срабатывает и на reload от внешнего collaborator'а (в том числе посреди countdown).
pub fn reset_level_on_reload(
    mut reload: EventReader<LevelReloadRequested>,
    mut run: RunResources,
    mut virtual_time: ResMut<Time<Virtual>>,
) {
    if reload.read().count() == 0 {
        return;
    }

    run.reset();
    virtual_time.set_relative_speed(1.0);
    crate::log("Run state reset after level reload");
}

/// Plugin lifecycle
pub struct LifecyclePlugin;

impl Plugin for LifecyclePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LifecycleState>()
            .add_event::<GameOverShown>()
            .add_event::<RestartCountdownChanged>()
            .add_event::<LevelReloadRequested>()
            .add_systems(
                Update,
                (show_game_over, tick_restart_countdown, reset_level_on_reload).chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_reports_each_whole_second() {
        let mut countdown = RestartCountdown::new(3.0);
        assert_eq!(countdown.seconds_left(), 3);

        let mut reported = Vec::new();
        let mut finished_at = None;
        for step in 0..40 {
            let tick = countdown.tick(0.1);
            if let Some(seconds) = tick.seconds_left {
                reported.push(seconds);
            }
            if tick.finished {
                finished_at = Some(step);
                break;
            }
        }

        assert_eq!(reported, vec![2, 1, 0]);
        // 3.0 / 0.1 = 30 шагов (± float погрешность)
        let finished_at = finished_at.expect("countdown finishes");
        assert!((29..=30).contains(&finished_at));
    }

    #[test]
    fn test_zero_delay_finishes_immediately() {
        let mut countdown = RestartCountdown::new(0.0);
        assert!(countdown.tick(0.0).finished);
    }

    #[test]
    fn test_large_delta_jumps_to_finish() {
        let mut countdown = RestartCountdown::new(3.0);
        let tick = countdown.tick(10.0);
        assert_eq!(tick.seconds_left, Some(0));
        assert!(tick.finished);
    }
}
