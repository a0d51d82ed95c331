//! Hand-off of finalized sessions to the reporting service

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::aggregator::GameSession;

/// Acknowledgment returned by the reporting service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAck {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionAck {
    pub fn accepted(session_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            success: true,
            session_id: Some(session_id),
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            session_id: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Receives finalized sessions. The ack is passed through uninterpreted.
pub trait SessionReporter {
    fn submit(&self, session: &GameSession) -> SubmissionAck;
}

/// Reporter that writes the serialized record to the log
#[derive(Debug, Default)]
pub struct LogReporter;

impl SessionReporter for LogReporter {
    fn submit(&self, session: &GameSession) -> SubmissionAck {
        if !session.is_finished() {
            return SubmissionAck::rejected("session has not been finished");
        }

        match serde_json::to_string(session) {
            Ok(json) => {
                let session_id = Uuid::new_v4();
                info!(session_id = %session_id, record = %json, "Session submitted");
                SubmissionAck::accepted(session_id, "session recorded")
            }
            Err(e) => {
                warn!(error = %e, "Failed to serialize session");
                SubmissionAck::rejected(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{GameMode, SessionAggregator};

    #[test]
    fn log_reporter_accepts_finished_session() {
        let mut agg = SessionAggregator::start(GameMode::Multiplayer, Some("arena".into()));
        let record = agg.finish(10, true).unwrap();
        let ack = LogReporter.submit(&record);
        assert!(ack.success);
        assert!(ack.session_id.is_some());
        assert!(ack.error.is_none());
    }

    #[test]
    fn log_reporter_rejects_open_session() {
        let agg = SessionAggregator::start(GameMode::SinglePlayer, None);
        let ack = LogReporter.submit(agg.session());
        assert!(!ack.success);
        assert!(ack.error.is_some());
    }

    #[test]
    fn ack_omits_absent_fields() {
        let json = serde_json::to_value(SubmissionAck::rejected("nope")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "nope");
        assert!(json.get("sessionId").is_none());
        assert!(json.get("message").is_none());
    }
}
