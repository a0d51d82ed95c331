//! Per-tick orchestration of input, weapons, damage hand-off and aggregation

use tracing::{debug, info, warn};

use crate::session::{
    GameSession, PickupKind, SessionAggregator, SessionError, SessionReporter, SubmissionAck,
};
use crate::state::SharedGameState;
use crate::weapons::{FireOutcome, HitRequest, Loadout, SplashRequest};

/// Damage/collision collaborator. Requests are fire-and-forget.
pub trait DamageSink {
    fn dispatch_hit(&mut self, hit: &HitRequest);
    fn dispatch_splash(&mut self, splash: &SplashRequest);
}

/// Outcomes resolved by collaborators since the previous tick
#[derive(Debug, Clone, Default)]
pub struct TickFeedback {
    /// One entry per resolved shot, `true` when it struck something
    pub shots: Vec<bool>,
    pub demon_kills: u32,
    pub player_kills: u32,
    pub deaths: u32,
    pub pickups: Vec<PickupKind>,
    pub demons_spawned: u32,
    pub wave_level: Option<u32>,
}

/// What happened during one tick
#[derive(Debug)]
pub struct TickReport {
    pub tick: u64,
    /// `None` when the trigger was not pulled
    pub fire: Option<FireOutcome>,
}

/// The simulation step for one player session
pub struct GameLoop<D> {
    input: SharedGameState,
    loadout: Loadout,
    session: SessionAggregator,
    damage: D,
    tick: u64,
}

impl<D: DamageSink> GameLoop<D> {
    pub fn new(
        input: SharedGameState,
        loadout: Loadout,
        session: SessionAggregator,
        damage: D,
    ) -> Self {
        Self {
            input,
            loadout,
            session,
            damage,
            tick: 0,
        }
    }

    /// Run one tick: sample input, evaluate the weapon, hand off damage, then
    /// apply collaborator feedback to the session counters.
    pub fn tick(
        &mut self,
        now_ms: u64,
        delta_ms: u64,
        feedback: &TickFeedback,
    ) -> Result<TickReport, SessionError> {
        if self.session.is_finished() {
            return Err(SessionError::AlreadyFinished);
        }
        self.tick += 1;

        // Input
        let slot = self.input.take_weapon_slot();
        let input = self.input.snapshot();

        // Weapons
        if let Some(slot) = slot {
            self.switch_to_slot(slot);
        }
        self.loadout.decay_recoil(delta_ms);

        let fire = if input.fire && input.pointer_locked {
            self.loadout
                .active_mut()
                .map(|weapon| weapon.try_fire(now_ms, input.aim))
        } else {
            None
        };

        // Damage
        if let Some(FireOutcome::Fired(event)) = &fire {
            for hit in &event.hits {
                self.damage.dispatch_hit(hit);
            }
            if let Some(splash) = &event.splash {
                self.damage.dispatch_splash(splash);
            }
            debug!(
                tick = self.tick,
                weapon = %event.weapon_id,
                pellets = event.hits.len(),
                ammo = event.ammo_remaining,
                "Weapon fired"
            );
        }

        // Aggregation
        self.apply_feedback(feedback)?;

        Ok(TickReport {
            tick: self.tick,
            fire,
        })
    }

    /// Number keys are 1-based slots in equip order
    fn switch_to_slot(&mut self, slot: u8) {
        let Some(index) = usize::from(slot).checked_sub(1) else {
            return;
        };
        let Some(id) = self.loadout.slot(index).map(str::to_string) else {
            debug!(slot, "No weapon in requested slot");
            return;
        };
        if let Err(e) = self.loadout.select(&id) {
            warn!(slot, error = %e, "Weapon switch failed");
        }
    }

    fn apply_feedback(&mut self, feedback: &TickFeedback) -> Result<(), SessionError> {
        for &hit in &feedback.shots {
            self.session.record_shot(hit)?;
        }
        for _ in 0..feedback.demon_kills {
            self.session.record_kill(false)?;
        }
        for _ in 0..feedback.player_kills {
            self.session.record_kill(true)?;
        }
        for _ in 0..feedback.deaths {
            self.session.record_death()?;
        }
        for _ in 0..feedback.demons_spawned {
            self.session.record_demon_spawn()?;
        }
        for &kind in &feedback.pickups {
            self.session.record_pickup(kind)?;
            if kind == PickupKind::Ammo {
                self.refill_active_from_pack();
            }
        }
        if let Some(level) = feedback.wave_level {
            self.session.set_wave_level(level)?;
        }
        Ok(())
    }

    /// An ammo pack restores half a magazine of the active weapon
    fn refill_active_from_pack(&mut self) {
        if let Some(weapon) = self.loadout.active_mut() {
            let rounds = (weapon.definition().max_ammo / 2).max(1);
            let added = weapon.resupply(rounds);
            debug!(weapon = %weapon.definition().id, added, "Ammo pack collected");
        }
    }

    /// Close the session, hand it to the reporter and reset the shared input
    /// for the next session.
    pub fn finish(
        &mut self,
        final_score: u64,
        completed: bool,
        reporter: &dyn SessionReporter,
    ) -> Result<(GameSession, SubmissionAck), SessionError> {
        let record = self.session.finish(final_score, completed)?;
        let ack = reporter.submit(&record);
        info!(
            success = ack.success,
            session_id = ?ack.session_id,
            ticks = self.tick,
            "Session reported"
        );
        self.input.reset();
        Ok((record, ack))
    }

    pub fn input(&self) -> &SharedGameState {
        &self.input
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    pub fn session(&self) -> &GameSession {
        self.session.session()
    }

    pub fn damage(&self) -> &D {
        &self.damage
    }

    pub fn damage_mut(&mut self) -> &mut D {
        &mut self.damage
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::session::{GameMode, LogReporter};
    use crate::weapons::{Aim, NotFiredReason, WeaponCatalog};

    /// Records every request it receives
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub hits: Vec<HitRequest>,
        pub splashes: Vec<SplashRequest>,
    }

    impl DamageSink for RecordingSink {
        fn dispatch_hit(&mut self, hit: &HitRequest) {
            self.hits.push(*hit);
        }

        fn dispatch_splash(&mut self, splash: &SplashRequest) {
            self.splashes.push(*splash);
        }
    }

    pub(crate) fn game() -> GameLoop<RecordingSink> {
        let catalog = Arc::new(WeaponCatalog::builtin().unwrap());
        let mut loadout = Loadout::with_default(catalog, 5).unwrap();
        loadout.equip("shotgun").unwrap();
        loadout.equip("rocket_launcher").unwrap();
        GameLoop::new(
            SharedGameState::new(),
            loadout,
            SessionAggregator::start(GameMode::SinglePlayer, Some("hangar".into())),
            RecordingSink::default(),
        )
    }

    fn pull_trigger(game: &GameLoop<RecordingSink>) {
        game.input().update(|s| {
            s.fire = true;
            s.pointer_locked = true;
            s.aim = Aim::new(0.3, 0.0);
        });
    }

    #[test]
    fn idle_input_does_not_fire() {
        let mut game = game();
        let report = game.tick(0, 16, &TickFeedback::default()).unwrap();
        assert!(report.fire.is_none());
        assert!(game.damage().hits.is_empty());
    }

    #[test]
    fn fire_requires_pointer_lock() {
        let mut game = game();
        game.input().update(|s| s.fire = true);
        let report = game.tick(0, 16, &TickFeedback::default()).unwrap();
        assert!(report.fire.is_none());
    }

    #[test]
    fn shotgun_pellets_reach_the_damage_sink() {
        let mut game = game();
        pull_trigger(&game);
        game.input().update(|s| s.weapon_slot = Some(2));

        let report = game.tick(0, 16, &TickFeedback::default()).unwrap();
        assert!(report.fire.unwrap().fired());
        assert_eq!(game.loadout().active_id(), Some("shotgun"));
        assert_eq!(game.damage().hits.len(), 8);
        assert!(game.damage().splashes.is_empty());

        // Held trigger inside the fire interval
        let report = game.tick(16, 16, &TickFeedback::default()).unwrap();
        assert!(matches!(
            report.fire,
            Some(FireOutcome::NotFired(NotFiredReason::Cooldown))
        ));
        assert_eq!(game.damage().hits.len(), 8);
    }

    #[test]
    fn rocket_emits_single_splash() {
        let mut game = game();
        pull_trigger(&game);
        game.input().update(|s| s.weapon_slot = Some(3));
        let _ = game.tick(0, 16, &TickFeedback::default()).unwrap();
        assert_eq!(game.damage().hits.len(), 1);
        assert_eq!(game.damage().splashes.len(), 1);
    }

    #[test]
    fn feedback_updates_session_counters() {
        let mut game = game();
        let feedback = TickFeedback {
            shots: vec![true, false, true],
            demon_kills: 2,
            player_kills: 1,
            deaths: 1,
            pickups: vec![PickupKind::Health],
            demons_spawned: 4,
            wave_level: Some(2),
        };
        game.tick(0, 16, &feedback).unwrap();

        let s = game.session();
        assert_eq!(s.shots_fired, 3);
        assert_eq!(s.shots_hit, 2);
        assert_eq!(s.demon_kills, 2);
        assert_eq!(s.player_kills, 1);
        assert_eq!(s.player_deaths, 1);
        assert_eq!(s.health_packs_collected, 1);
        assert_eq!(s.demons_created, 4);
        assert_eq!(s.wave_level, 2);
    }

    #[test]
    fn ammo_pack_refills_active_weapon() {
        let mut game = game();
        pull_trigger(&game);
        let _ = game.tick(0, 16, &TickFeedback::default()).unwrap();
        assert_eq!(game.loadout().active().unwrap().ammo(), 11);

        game.input().update(|s| s.fire = false);
        let feedback = TickFeedback {
            pickups: vec![PickupKind::Ammo],
            ..Default::default()
        };
        game.tick(16, 16, &feedback).unwrap();
        assert_eq!(game.loadout().active().unwrap().ammo(), 12);
        assert_eq!(game.session().ammo_packs_collected, 1);
    }

    #[test]
    fn finish_reports_and_resets_input() {
        let mut game = game();
        let observer = game.input().current();
        pull_trigger(&game);
        game.tick(0, 16, &TickFeedback {
            shots: vec![true],
            ..Default::default()
        })
        .unwrap();

        let (record, ack) = game.finish(300, true, &LogReporter).unwrap();
        assert!(ack.success);
        assert_eq!(record.accuracy_percentage, Some(100.0));
        assert!(observer.ptr_eq(game.input()));
        assert!(!observer.snapshot().fire);

        assert_eq!(
            game.tick(32, 16, &TickFeedback::default()).unwrap_err(),
            SessionError::AlreadyFinished
        );
        assert_eq!(
            game.finish(0, false, &LogReporter).unwrap_err(),
            SessionError::AlreadyFinished
        );
    }
}
