//! Arena combat core
//!
//! Combat resolution and session state for a real-time arena shooter:
//! - Weapon catalog and per-weapon firing state machines
//! - Shared input state handed to every consumer at startup
//! - Session counters and the finalized record for reporting
//! - A fixed-rate simulation loop tying them together

pub mod config;
pub mod session;
pub mod sim;
pub mod state;
pub mod util;
pub mod weapons;
