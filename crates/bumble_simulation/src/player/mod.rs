//! Player flyer (пчела)
//!
//! Player entity управляется через `FlightInput` (input layer снаружи crate),
//! AI systems его не трогают.

use bevy::prelude::*;
use crate::SimulationSet;

pub mod controller;
pub mod spawn;

pub use controller::{
    apply_flight_input, speed_multiplier, step_flight, AnimationRate, FlightController,
    FlightInput, PlayerGameOver, VerticalIntent,
};
pub use spawn::spawn_player;

/// Plugin пчелы: flight controller в Steering фазе
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<FlightInput>()
            .register_type::<FlightController>()
            .register_type::<AnimationRate>()
            .add_event::<PlayerGameOver>()
            .add_systems(
                FixedUpdate,
                apply_flight_input.in_set(SimulationSet::Steering),
            );
    }
}
