//! Weapon controller - per-instance firing state machine
//!
//! Each equipped weapon owns a `WeaponController` holding its ammo, last
//! shot timestamp and recoil. Firing produces plain request values for the
//! damage collaborator; nothing is resolved here.

use std::f32::consts::FRAC_PI_8;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::WeaponDefinition;

/// Upper bound for accumulated recoil
pub const MAX_RECOIL: f32 = 1.0;

/// Recoil recovered per second of decay
pub const RECOIL_DECAY_PER_SEC: f32 = 3.0;

/// Angular deviation (radians) reached at `spread_angle_fraction == 1.0`
pub const MAX_SPREAD_RADIANS: f32 = FRAC_PI_8;

/// Aim direction in radians
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aim {
    pub yaw: f32,
    pub pitch: f32,
}

impl Aim {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }
}

/// One pellet's worth of damage for the collision collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRequest {
    pub direction: Aim,
    pub damage: f32,
}

/// Area damage centered on wherever the shot lands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplashRequest {
    /// Base aim of the shot; the collaborator resolves the impact point along it
    pub direction: Aim,
    pub radius: f32,
    pub damage: f32,
}

/// Everything a successful trigger pull produced
#[derive(Debug, Clone)]
pub struct FireEvent {
    pub weapon_id: String,
    pub fired_at_ms: u64,
    pub hits: Vec<HitRequest>,
    pub splash: Option<SplashRequest>,
    pub ammo_remaining: u32,
}

/// Why a trigger pull was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFiredReason {
    Cooldown,
    Empty,
}

/// Result of `try_fire`
#[derive(Debug, Clone)]
#[must_use]
pub enum FireOutcome {
    Fired(FireEvent),
    NotFired(NotFiredReason),
}

impl FireOutcome {
    pub fn fired(&self) -> bool {
        matches!(self, FireOutcome::Fired(_))
    }

    pub fn event(&self) -> Option<&FireEvent> {
        match self {
            FireOutcome::Fired(event) => Some(event),
            FireOutcome::NotFired(_) => None,
        }
    }
}

/// Observable weapon state. `Firing` only exists inside `try_fire`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireState {
    Idle,
    Cooldown,
    Empty,
}

/// Mutable state for one equipped weapon
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponRuntimeState {
    pub current_ammo: u32,
    /// `None` until the first shot
    pub last_fired_at_ms: Option<u64>,
    pub accumulated_recoil: f32,
}

/// Firing state machine for one weapon instance
pub struct WeaponController {
    definition: Arc<WeaponDefinition>,
    state: WeaponRuntimeState,
    rng: ChaCha8Rng,
}

impl WeaponController {
    /// Equip a weapon with a full magazine
    pub fn new(definition: Arc<WeaponDefinition>, seed: u64) -> Self {
        let state = WeaponRuntimeState {
            current_ammo: definition.max_ammo,
            last_fired_at_ms: None,
            accumulated_recoil: 0.0,
        };
        Self {
            definition,
            state,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn definition(&self) -> &WeaponDefinition {
        &self.definition
    }

    pub fn runtime(&self) -> &WeaponRuntimeState {
        &self.state
    }

    pub fn ammo(&self) -> u32 {
        self.state.current_ammo
    }

    pub fn recoil(&self) -> f32 {
        self.state.accumulated_recoil
    }

    /// Time left before the next shot is allowed
    pub fn cooldown_remaining(&self, now_ms: u64) -> u64 {
        match self.state.last_fired_at_ms {
            Some(last) => {
                let ready_at = last.saturating_add(self.definition.fire_interval_ms);
                ready_at.saturating_sub(now_ms)
            }
            None => 0,
        }
    }

    pub fn state(&self, now_ms: u64) -> FireState {
        if self.state.current_ammo == 0 {
            FireState::Empty
        } else if self.cooldown_remaining(now_ms) > 0 {
            FireState::Cooldown
        } else {
            FireState::Idle
        }
    }

    /// Attempt a shot at `now_ms`. Rejections leave the state untouched.
    pub fn try_fire(&mut self, now_ms: u64, aim: Aim) -> FireOutcome {
        match self.state(now_ms) {
            FireState::Empty => {
                debug!(weapon = %self.definition.id, "Trigger pulled on empty weapon");
                return FireOutcome::NotFired(NotFiredReason::Empty);
            }
            FireState::Cooldown => return FireOutcome::NotFired(NotFiredReason::Cooldown),
            FireState::Idle => {}
        }

        self.state.current_ammo -= 1;
        self.state.last_fired_at_ms = Some(now_ms);
        self.state.accumulated_recoil =
            (self.state.accumulated_recoil + self.definition.recoil_impulse).min(MAX_RECOIL);

        let damage = self.definition.damage_per_hit;
        let max_offset = self.definition.spread_angle_fraction * MAX_SPREAD_RADIANS;
        let hits = (0..self.definition.pellet_count)
            .map(|_| HitRequest {
                direction: self.perturb(aim, max_offset),
                damage,
            })
            .collect();

        let splash = self.definition.splash_radius.map(|radius| SplashRequest {
            direction: aim,
            radius,
            damage,
        });

        FireOutcome::Fired(FireEvent {
            weapon_id: self.definition.id.clone(),
            fired_at_ms: now_ms,
            hits,
            splash,
            ammo_remaining: self.state.current_ammo,
        })
    }

    /// Uniform symmetric offset on each axis, bounded by `max_offset`
    fn perturb(&mut self, aim: Aim, max_offset: f32) -> Aim {
        if max_offset <= 0.0 {
            return aim;
        }
        Aim {
            yaw: aim.yaw + self.rng.gen_range(-max_offset..=max_offset),
            pitch: aim.pitch + self.rng.gen_range(-max_offset..=max_offset),
        }
    }

    /// Recover recoil over `delta_ms`; never increases it
    pub fn decay_recoil(&mut self, delta_ms: u64) {
        let recovered = RECOIL_DECAY_PER_SEC * delta_ms as f32 / 1_000.0;
        self.state.accumulated_recoil = (self.state.accumulated_recoil - recovered).max(0.0);
    }

    /// Add rounds, clamped to capacity. Returns rounds actually added.
    pub fn resupply(&mut self, amount: u32) -> u32 {
        let before = self.state.current_ammo;
        self.state.current_ammo = before.saturating_add(amount).min(self.definition.max_ammo);
        self.state.current_ammo - before
    }

    /// Refill to capacity
    pub fn reload(&mut self) -> u32 {
        self.resupply(self.definition.max_ammo)
    }
}
