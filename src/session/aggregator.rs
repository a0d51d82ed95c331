//! Session aggregation - raw counters during play, derived stats at close

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Session mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    #[default]
    SinglePlayer,
    Multiplayer,
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single-player" | "singleplayer" | "single" => Ok(Self::SinglePlayer),
            "multiplayer" | "multi" => Ok(Self::Multiplayer),
            other => Err(format!("unknown game mode: {other}")),
        }
    }
}

/// Pickup categories tracked per session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    Health,
    Ammo,
}

/// Session record in the shape the reporting service expects.
///
/// `duration_seconds` and `accuracy_percentage` stay `None` until the session
/// is finished and are computed from the raw counters exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub mode: GameMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_type: Option<String>,
    pub wave_level: u32,
    pub demon_kills: u32,
    pub player_deaths: u32,
    pub health_packs_collected: u32,
    pub ammo_packs_collected: u32,
    pub player_kills: u32,
    pub demons_created: u32,
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub final_score: u64,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_percentage: Option<f64>,
}

impl GameSession {
    fn new(mode: GameMode, map_type: Option<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time: None,
            mode,
            map_type,
            wave_level: 0,
            demon_kills: 0,
            player_deaths: 0,
            health_packs_collected: 0,
            ammo_packs_collected: 0,
            player_kills: 0,
            demons_created: 0,
            shots_fired: 0,
            shots_hit: 0,
            final_score: 0,
            completed: false,
            duration_seconds: None,
            accuracy_percentage: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }
}

/// Hit percentage, 0 when nothing was fired
pub fn accuracy_percentage(shots_fired: u32, shots_hit: u32) -> f64 {
    if shots_fired == 0 {
        return 0.0;
    }
    f64::from(shots_hit.min(shots_fired)) / f64::from(shots_fired) * 100.0
}

/// Whole seconds between two instants, truncated, never negative
pub fn duration_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    (end - start).num_seconds().max(0) as u64
}

/// Accumulates one session's counters and finalizes the record
#[derive(Debug)]
pub struct SessionAggregator {
    session: GameSession,
}

impl SessionAggregator {
    /// Open a session now
    pub fn start(mode: GameMode, map_type: Option<String>) -> Self {
        Self::start_at(Utc::now(), mode, map_type)
    }

    /// Open a session at a caller-provided time
    pub fn start_at(start_time: DateTime<Utc>, mode: GameMode, map_type: Option<String>) -> Self {
        info!(?mode, map = ?map_type, "Session started");
        Self {
            session: GameSession::new(mode, map_type, start_time),
        }
    }

    /// Read-only view of the record
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    /// Apply a counter change, refusing once the session is closed
    fn mutate(&mut self, f: impl FnOnce(&mut GameSession)) -> Result<(), SessionError> {
        if self.session.is_finished() {
            warn!("Counter update on a finished session ignored");
            return Err(SessionError::AlreadyFinished);
        }
        f(&mut self.session);
        Ok(())
    }

    pub fn record_shot(&mut self, hit: bool) -> Result<(), SessionError> {
        self.mutate(|s| {
            s.shots_fired = s.shots_fired.saturating_add(1);
            if hit {
                s.shots_hit = s.shots_hit.saturating_add(1);
            }
        })
    }

    pub fn record_kill(&mut self, is_player_kill: bool) -> Result<(), SessionError> {
        self.mutate(|s| {
            if is_player_kill {
                s.player_kills = s.player_kills.saturating_add(1);
            } else {
                s.demon_kills = s.demon_kills.saturating_add(1);
            }
        })
    }

    pub fn record_death(&mut self) -> Result<(), SessionError> {
        self.mutate(|s| s.player_deaths = s.player_deaths.saturating_add(1))
    }

    pub fn record_pickup(&mut self, kind: PickupKind) -> Result<(), SessionError> {
        self.mutate(|s| match kind {
            PickupKind::Health => {
                s.health_packs_collected = s.health_packs_collected.saturating_add(1)
            }
            PickupKind::Ammo => s.ammo_packs_collected = s.ammo_packs_collected.saturating_add(1),
        })
    }

    pub fn record_demon_spawn(&mut self) -> Result<(), SessionError> {
        self.mutate(|s| s.demons_created = s.demons_created.saturating_add(1))
    }

    /// Raise the wave level; lower values are ignored
    pub fn set_wave_level(&mut self, level: u32) -> Result<(), SessionError> {
        self.mutate(|s| s.wave_level = s.wave_level.max(level))
    }

    /// Close the session now
    pub fn finish(&mut self, final_score: u64, completed: bool) -> Result<GameSession, SessionError> {
        self.finish_at(Utc::now(), final_score, completed)
    }

    /// Close the session at a caller-provided time. An end time before the
    /// start is clamped to the start.
    pub fn finish_at(
        &mut self,
        end_time: DateTime<Utc>,
        final_score: u64,
        completed: bool,
    ) -> Result<GameSession, SessionError> {
        if self.session.is_finished() {
            return Err(SessionError::AlreadyFinished);
        }

        let session = &mut self.session;
        let end_time = end_time.max(session.start_time);
        session.end_time = Some(end_time);
        session.final_score = final_score;
        session.completed = completed;
        session.duration_seconds = Some(duration_seconds(session.start_time, end_time));
        session.accuracy_percentage =
            Some(accuracy_percentage(session.shots_fired, session.shots_hit));

        info!(
            duration_secs = session.duration_seconds,
            accuracy = session.accuracy_percentage,
            score = final_score,
            completed,
            "Session finished"
        );

        Ok(session.clone())
    }
}

/// Session errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Session already finished")]
    AlreadyFinished,
}
