//! Process-wide mutable state shared between the sampler, overlay and loop

pub mod input;

pub use input::{InputState, SharedGameState};
