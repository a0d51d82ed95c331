//! Simulation loop wiring

pub mod driver;
pub mod game_loop;

pub use driver::run_frames;
pub use game_loop::{DamageSink, GameLoop, TickFeedback, TickReport};
