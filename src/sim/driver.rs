//! Fixed-rate frame driver

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::session::SessionError;
use crate::util::time::{tick_millis, Timer};

use super::game_loop::{DamageSink, GameLoop, TickFeedback};

/// Drive `game` at `tps` for up to `ticks` frames.
///
/// `before_tick` runs first in every frame: it stands in for the input
/// sampler and the collaborators that resolved last frame's damage requests,
/// and returns their feedback for the aggregation step.
pub async fn run_frames<D, F>(
    game: &mut GameLoop<D>,
    tps: u32,
    ticks: u64,
    mut before_tick: F,
) -> Result<u64, SessionError>
where
    D: DamageSink,
    F: FnMut(u64, &mut D) -> TickFeedback,
{
    let tick_duration = Duration::from_millis(tick_millis(tps));
    let mut tick_interval = interval(tick_duration);
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let clock = Timer::new();
    let mut last_ms = clock.elapsed_ms();

    info!(tps, ticks, "Frame driver started");

    for frame in 0..ticks {
        tick_interval.tick().await;

        let now_ms = clock.elapsed_ms();
        let delta_ms = now_ms.saturating_sub(last_ms);
        last_ms = now_ms;

        let feedback = before_tick(frame, game.damage_mut());
        let report = game.tick(now_ms, delta_ms, &feedback)?;
        if let Some(outcome) = &report.fire {
            debug!(tick = report.tick, fired = outcome.fired(), "Trigger evaluated");
        }
    }

    Ok(game.ticks())
}
