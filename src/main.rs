//! Arena Sim - headless driver for the combat core
//!
//! Runs one scripted session end to end:
//! - Scripted input sampler writing into the shared input state
//! - Random target range standing in for the damage collaborator
//! - Logging reporter receiving the finalized session

use std::sync::Arc;

use arena_combat_core::config::Config;
use arena_combat_core::session::{LogReporter, PickupKind, SessionAggregator};
use arena_combat_core::sim::{run_frames, DamageSink, GameLoop, TickFeedback};
use arena_combat_core::state::SharedGameState;
use arena_combat_core::weapons::{Aim, HitRequest, Loadout, SplashRequest, WeaponCatalog};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Frames between demon spawns
const SPAWN_EVERY: u64 = 45;
/// Frames per wave
const WAVE_EVERY: u64 = 300;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting Arena Sim");

    let catalog = Arc::new(match &config.weapon_catalog_path {
        Some(path) => {
            info!(path = %path.display(), "Loading weapon table");
            WeaponCatalog::load(path, config.catalog_default())?
        }
        None => WeaponCatalog::builtin()?,
    });

    // One input state for the whole process; every consumer gets a handle
    let input = SharedGameState::new();
    let sampler = input.current();

    let mut loadout = Loadout::with_default(catalog.clone(), config.spread_seed)?;
    if let Some(weapon) = &config.starting_weapon {
        loadout.equip(weapon)?;
        loadout.select(weapon)?;
    }
    for id in catalog.ids() {
        loadout.equip(id)?;
    }

    let session = SessionAggregator::start(config.game_mode, config.map_type.clone());
    let range = TargetRange::new(config.spread_seed);
    let mut game = GameLoop::new(input, loadout, session, range);

    let slots = game.loadout().len() as u64;
    let frames = run_frames(&mut game, config.simulation_tps, config.demo_ticks, |frame, range| {
        sample_input(&sampler, frame, slots);
        range.resolve(frame)
    });

    let completed = tokio::select! {
        result = frames => {
            let ticks = result?;
            info!(ticks, "Scripted session complete");
            true
        }
        _ = shutdown_signal() => false,
    };

    let score = score_for(game.session());
    let (_record, ack) = game.finish(score, completed, &LogReporter)?;
    if !ack.success {
        warn!(error = ?ack.error, "Session report rejected");
    }

    info!("Arena Sim shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Scripted player: strafe, sweep aim, fire in bursts, cycle weapons
fn sample_input(input: &SharedGameState, frame: u64, slots: u64) {
    input.update(|s| {
        s.pointer_locked = true;
        s.move_forward = frame % 120 < 60;
        s.move_left = frame % 80 < 40;
        s.move_right = !s.move_left;
        s.sprint = frame % 200 < 50;
        s.jump = frame % 90 == 0;
        s.fire = frame % 30 < 20;
        s.aim = Aim::new((frame as f32 * 0.01).sin(), 0.0);
        if slots > 0 && frame % 150 == 0 {
            s.weapon_slot = Some(((frame / 150) % slots + 1) as u8);
        }
    });
}

fn score_for(session: &arena_combat_core::session::GameSession) -> u64 {
    u64::from(session.demon_kills) * 100
        + u64::from(session.player_kills) * 250
        + u64::from(session.wave_level) * 500
}

/// Damage collaborator stand-in: each request lands with a fixed chance
struct TargetRange {
    rng: ChaCha8Rng,
    pending_hits: Vec<HitRequest>,
    pending_splashes: Vec<SplashRequest>,
}

impl TargetRange {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed ^ 0xD3AD),
            pending_hits: Vec::new(),
            pending_splashes: Vec::new(),
        }
    }

    /// Resolve everything dispatched last frame into session feedback
    fn resolve(&mut self, frame: u64) -> TickFeedback {
        let mut feedback = TickFeedback::default();

        for hit in self.pending_hits.drain(..) {
            // Wider deviation from straight ahead misses more often
            let chance = (0.6 - f64::from(hit.direction.pitch.abs())).clamp(0.1, 0.9);
            let struck = self.rng.gen_bool(chance);
            feedback.shots.push(struck);
            if struck && self.rng.gen_bool(f64::from(hit.damage / 100.0).min(1.0)) {
                feedback.demon_kills += 1;
            }
        }
        for splash in self.pending_splashes.drain(..) {
            let caught = self.rng.gen_range(0..=splash.radius as u32);
            feedback.demon_kills += caught;
        }

        if frame > 0 && frame % SPAWN_EVERY == 0 {
            feedback.demons_spawned = self.rng.gen_range(1..=3);
        }
        if frame % WAVE_EVERY == 0 {
            feedback.wave_level = Some((frame / WAVE_EVERY + 1) as u32);
        }
        if frame > 0 && frame % 240 == 0 {
            feedback.pickups.push(PickupKind::Ammo);
        }
        if frame > 0 && frame % 360 == 0 {
            feedback.pickups.push(PickupKind::Health);
        }
        if self.rng.gen_bool(0.002) {
            feedback.deaths += 1;
        }

        feedback
    }
}

impl DamageSink for TargetRange {
    fn dispatch_hit(&mut self, hit: &HitRequest) {
        self.pending_hits.push(*hit);
    }

    fn dispatch_splash(&mut self, splash: &SplashRequest) {
        self.pending_splashes.push(*splash);
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, closing session early");
        }
        _ = terminate => {
            info!("Received terminate signal, closing session early");
        }
    }
}
