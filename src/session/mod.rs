//! Session bookkeeping and reporting

pub mod aggregator;
pub mod report;

pub use aggregator::{GameMode, GameSession, PickupKind, SessionAggregator, SessionError};
pub use report::{LogReporter, SessionReporter, SubmissionAck};
