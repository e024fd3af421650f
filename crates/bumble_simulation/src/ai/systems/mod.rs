//! AI systems (wasp FSM, steering, contact resolution)

pub mod contacts;
pub mod fsm;
pub mod movement;

// Re-export all systems
pub use contacts::*;
pub use fsm::*;
pub use movement::*;
