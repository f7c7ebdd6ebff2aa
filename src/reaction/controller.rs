use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::thread;
use tokio_util::sync::CancellationToken;

use crate::{
    analytics::AnalyticsStream,
    arm::{pickup, ArmController, PickupConfig},
    audio::{SoundLibrary, SoundPlayer},
    models::{AlarmCatalog, AlarmCategory, AlertId, Position, Snapshot},
};

use super::{debounce, PilePositions, ReactionConfig, ReactionState};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// What a single loop iteration did.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub alert_id: AlertId,
    pub category: AlarmCategory,
    pub sound: PathBuf,
}

fn unix_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Reacts to mask alerts, one snapshot at a time: a snack for a masked
/// person, a mask (thrown) for a maskless one.
pub struct ReactionController<A, P> {
    arm: A,
    player: P,
    sounds: SoundLibrary,
    catalog: AlarmCatalog,
    piles: PilePositions,
    config: ReactionConfig,
    pickup: PickupConfig,
    state: ReactionState,
    clock: fn() -> f64,
    cancel_token: CancellationToken,
}

impl<A: ArmController, P: SoundPlayer> ReactionController<A, P> {
    pub fn new(
        arm: A,
        player: P,
        sounds: SoundLibrary,
        catalog: AlarmCatalog,
        piles: PilePositions,
        config: ReactionConfig,
    ) -> Self {
        Self {
            arm,
            player,
            sounds,
            catalog,
            piles,
            config,
            pickup: PickupConfig::default(),
            state: ReactionState::new(),
            clock: unix_now,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_pickup(mut self, pickup: PickupConfig) -> Self {
        self.pickup = pickup;
        self
    }

    /// Replace the wall clock, in Unix seconds.
    pub fn with_clock(mut self, clock: fn() -> f64) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &ReactionState {
        &self.state
    }

    /// Consume snapshots until the stream ends or `cancel_token` fires.
    /// A reaction interrupted by `cancel_token` releases the pump and ends the loop cleanly.
    pub fn run<S: AnalyticsStream>(&mut self, stream: S, cancel_token: &CancellationToken) -> Result<()> {
        self.cancel_token = cancel_token.clone();
        for snapshot in stream {
            if cancel_token.is_cancelled() {
                log_info!("reaction loop cancelled");
                return Ok(());
            }
            let snapshot = snapshot?;
            match self.handle_snapshot(&snapshot) {
                Ok(_) => {}
                Err(err) if cancel_token.is_cancelled() => {
                    log_warn!("{err:#}");
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }
        log_warn!("zone status stream ended");
        Ok(())
    }

    /// React to the snapshot's alerts if exactly one is eligible.
    pub fn handle_snapshot(&mut self, snapshot: &Snapshot) -> Result<Option<Dispatched>> {
        let eligible = debounce::filter(
            snapshot.alerts_in_zone(&self.config.zone_name),
            self.state.handled(),
            &self.catalog,
            self.state.last_reaction_time(),
            self.config.debounce_secs,
        );
        let Some(alert) = debounce::select_single(&eligible) else {
            return Ok(None);
        };
        let Some(category) = self.catalog.category(alert.alarm_id) else {
            return Ok(None);
        };
        let alert_id = alert.id;

        log_info!("Reacting to alert {alert_id} ({category:?})");
        let sound = self
            .dispatch(category)
            .with_context(|| format!("reaction to alert {alert_id} failed"))?;

        self.state.mark_handled(alert_id, (self.clock)());
        Ok(Some(Dispatched {
            alert_id,
            category,
            sound,
        }))
    }

    fn dispatch(&mut self, category: AlarmCategory) -> Result<PathBuf> {
        match category {
            AlarmCategory::Masked => {
                let sound = self.sounds.good.next_cue();
                self.respond(&sound, self.piles.snack, None)?;
                Ok(sound)
            }
            AlarmCategory::Maskless => {
                let sound = self.sounds.bad.next_cue();
                self.respond(&sound, self.piles.mask, Some(self.config.throw_position))?;
                Ok(sound)
            }
        }
    }

    /// Greet from home, pick an item off the pile, bring it back (or throw it) and let go.
    fn respond(&mut self, sound: &Path, pile: Position, throw: Option<Position>) -> Result<()> {
        let home = self.config.home;
        self.arm
            .set_position(home, self.config.home_speed, false, true)?;
        self.checkpoint()?;

        log_info!("Playing {}", sound.display());
        self.player.play(sound)?;
        self.checkpoint()?;

        pickup(&mut self.arm, pile, &self.pickup)?;
        self.checkpoint()?;

        self.arm
            .set_position(home, self.config.carry_speed, false, true)?;
        self.checkpoint()?;
        if let Some(throw) = throw {
            self.arm
                .set_position(throw, self.config.throw_speed, false, true)?;
        }

        self.arm.set_pump(false)?;
        if !self.config.release_pause.is_zero() {
            thread::sleep(self.config.release_pause);
        }
        self.arm
            .set_position(home, self.config.return_speed, false, true)
    }

    /// Abort between reaction steps once cancelled, leaving the pump off.
    fn checkpoint(&mut self) -> Result<()> {
        if self.cancel_token.is_cancelled() {
            self.arm.set_pump(false)?;
            bail!("interrupted mid-reaction, pump released");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::mock::{ArmCall, MockArm};
    use crate::audio::SoundCycle;
    use crate::models::{Alert, ZoneStatus};
    use std::collections::HashMap;
    use std::time::Duration;

    const NOW: f64 = 1_700_000_000.0;

    #[derive(Default)]
    struct RecordingPlayer {
        played: Vec<PathBuf>,
        fail: bool,
        cancel_on_play: Option<CancellationToken>,
    }

    impl SoundPlayer for RecordingPlayer {
        fn play(&mut self, file: &Path) -> Result<()> {
            if self.fail {
                bail!("no audio device");
            }
            self.played.push(file.to_path_buf());
            if let Some(token) = &self.cancel_on_play {
                token.cancel();
            }
            Ok(())
        }
    }

    fn sounds() -> SoundLibrary {
        SoundLibrary {
            good: SoundCycle::new(vec!["good/a.mp3".into(), "good/b.mp3".into()]).unwrap(),
            bad: SoundCycle::new(vec!["bad/a.mp3".into()]).unwrap(),
        }
    }

    fn piles() -> PilePositions {
        PilePositions {
            snack: Position::new(220.0, 80.0, 60.0),
            mask: Position::new(220.0, -80.0, 60.0),
        }
    }

    fn controller(player: RecordingPlayer) -> ReactionController<MockArm, RecordingPlayer> {
        let catalog =
            AlarmCatalog::from_alarms([(1, "Masked Person Detected!"), (2, "Maskless Person Detected!")]);
        let config = ReactionConfig {
            release_pause: Duration::ZERO,
            ..ReactionConfig::default()
        };
        let pickup = PickupConfig {
            poll_interval: Duration::ZERO,
            seat_pause: Duration::ZERO,
            max_down_distance: 9.0,
            ..PickupConfig::default()
        };
        ReactionController::new(MockArm::new(), player, sounds(), catalog, piles(), config)
            .with_pickup(pickup)
            .with_clock(|| NOW)
    }

    fn alert(id: AlertId, alarm_id: u64, start_time: f64) -> Alert {
        Alert {
            id,
            alarm_id,
            start_time,
            end_time: None,
            zone_id: None,
            stream_id: None,
        }
    }

    fn snapshot(streams: Vec<(&str, Vec<Alert>)>) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for (stream_id, alerts) in streams {
            let zones = HashMap::from([("Screen".to_string(), ZoneStatus { alerts })]);
            snapshot.0.insert(stream_id.to_string(), zones);
        }
        snapshot
    }

    #[test]
    fn masked_alert_gets_reward() {
        let mut controller = controller(RecordingPlayer::default());

        let dispatched = controller
            .handle_snapshot(&snapshot(vec![("1", vec![alert(42, 1, 10.0)])]))
            .unwrap();

        assert_eq!(
            dispatched,
            Some(Dispatched {
                alert_id: 42,
                category: AlarmCategory::Masked,
                sound: "good/a.mp3".into(),
            })
        );
        assert_eq!(controller.player.played, vec![PathBuf::from("good/a.mp3")]);
        assert_eq!(controller.state().handled().len(), 1);
        assert!(controller.state().is_handled(42));
        assert_eq!(controller.state().last_reaction_time(), NOW);

        let moves = controller.arm.absolute_moves();
        let home = Position::new(150.0, 0.0, 150.0);
        assert_eq!(moves.first(), Some(&(home, 100.0)));
        assert_eq!(moves[1], (piles().snack, 25.0));
        assert!(!moves.iter().any(|(p, _)| *p == Position::new(200.0, 0.0, 30.0)));
        assert_eq!(moves.last(), Some(&(home, 50.0)));
        assert_eq!(controller.arm.pump_changes(), vec![true, false]);
    }

    #[test]
    fn maskless_alert_gets_mask_thrown() {
        let mut controller = controller(RecordingPlayer::default());

        let dispatched = controller
            .handle_snapshot(&snapshot(vec![("1", vec![alert(7, 2, 10.0)])]))
            .unwrap()
            .unwrap();

        assert_eq!(dispatched.category, AlarmCategory::Maskless);
        assert_eq!(dispatched.sound, PathBuf::from("bad/a.mp3"));

        let moves = controller.arm.absolute_moves();
        let n = moves.len();
        assert_eq!(moves[1], (piles().mask, 25.0));
        assert_eq!(moves[n - 3], (Position::new(150.0, 0.0, 150.0), 30.0));
        assert_eq!(moves[n - 2], (Position::new(200.0, 0.0, 30.0), 125.0));

        let release = controller
            .arm
            .calls
            .iter()
            .rposition(|c| *c == ArmCall::SetPump(false))
            .unwrap();
        let throw = controller
            .arm
            .calls
            .iter()
            .position(|c| matches!(c, ArmCall::SetPosition { speed, .. } if *speed == 125.0))
            .unwrap();
        assert!(throw < release);
    }

    #[test]
    fn simultaneous_alerts_are_skipped() {
        let mut controller = controller(RecordingPlayer::default());

        let dispatched = controller
            .handle_snapshot(&snapshot(vec![
                ("1", vec![alert(1, 1, 10.0)]),
                ("2", vec![alert(2, 2, 10.0)]),
            ]))
            .unwrap();

        assert_eq!(dispatched, None);
        assert!(controller.state().handled().is_empty());
        assert_eq!(controller.state().last_reaction_time(), 0.0);
        assert!(controller.arm.calls.is_empty());
    }

    #[test]
    fn handled_alert_is_not_repeated() {
        let mut controller = controller(RecordingPlayer::default());
        let snap = snapshot(vec![("1", vec![alert(42, 1, NOW + 10.0)])]);

        assert!(controller.handle_snapshot(&snap).unwrap().is_some());
        assert!(controller.handle_snapshot(&snap).unwrap().is_none());
        assert_eq!(controller.player.played.len(), 1);
    }

    #[test]
    fn reactions_cycle_through_good_sounds() {
        let mut controller = controller(RecordingPlayer::default());
        let sounds: Vec<PathBuf> = (0..3)
            .map(|i| {
                let snap = snapshot(vec![("1", vec![alert(i, 1, NOW + 10.0 * (i + 1) as f64)])]);
                controller.handle_snapshot(&snap).unwrap().unwrap().sound
            })
            .collect();
        assert_eq!(
            sounds,
            vec![
                PathBuf::from("good/a.mp3"),
                PathBuf::from("good/b.mp3"),
                PathBuf::from("good/a.mp3")
            ]
        );
    }

    #[test]
    fn alerts_inside_debounce_window_wait() {
        let mut controller = controller(RecordingPlayer::default());
        controller
            .handle_snapshot(&snapshot(vec![("1", vec![alert(1, 1, 10.0)])]))
            .unwrap();

        let early = snapshot(vec![("1", vec![alert(2, 2, NOW + 2.0)])]);
        assert!(controller.handle_snapshot(&early).unwrap().is_none());

        let later = snapshot(vec![("1", vec![alert(3, 2, NOW + 3.0)])]);
        assert!(controller.handle_snapshot(&later).unwrap().is_some());
    }

    #[test]
    fn other_zones_are_ignored() {
        let mut controller = controller(RecordingPlayer::default());
        let mut snap = Snapshot::default();
        snap.0.insert(
            "1".to_string(),
            HashMap::from([(
                "Door".to_string(),
                ZoneStatus {
                    alerts: vec![alert(5, 1, 10.0)],
                },
            )]),
        );
        assert!(controller.handle_snapshot(&snap).unwrap().is_none());
    }

    #[test]
    fn failed_reaction_leaves_alert_unhandled() {
        let mut controller = controller(RecordingPlayer {
            fail: true,
            ..RecordingPlayer::default()
        });

        let err = controller
            .handle_snapshot(&snapshot(vec![("1", vec![alert(42, 1, 10.0)])]))
            .unwrap_err();

        assert!(err.to_string().contains("alert 42"));
        assert!(!controller.state().is_handled(42));
        assert_eq!(controller.state().last_reaction_time(), 0.0);
    }

    #[test]
    fn run_stops_when_cancelled() {
        let mut controller = controller(RecordingPlayer::default());
        let token = CancellationToken::new();
        token.cancel();
        let stream = std::iter::repeat_with(|| Ok(snapshot(vec![("1", vec![alert(1, 1, 10.0)])])));

        controller.run(stream, &token).unwrap();

        assert!(controller.arm.calls.is_empty());
    }

    #[test]
    fn run_propagates_stream_errors() {
        let mut controller = controller(RecordingPlayer::default());
        let stream = vec![
            Ok(snapshot(vec![("1", vec![alert(1, 1, 10.0)])])),
            Err(anyhow::anyhow!("connection reset")),
        ];

        let err = controller
            .run(stream.into_iter(), &CancellationToken::new())
            .unwrap_err();

        assert!(err.to_string().contains("connection reset"));
        assert!(controller.state().is_handled(1));
    }

    #[test]
    fn interrupt_mid_reaction_releases_pump() {
        let token = CancellationToken::new();
        let mut controller = controller(RecordingPlayer {
            cancel_on_play: Some(token.clone()),
            ..RecordingPlayer::default()
        });
        let stream = vec![Ok(snapshot(vec![("1", vec![alert(42, 2, 10.0)])]))];

        controller.run(stream.into_iter(), &token).unwrap();

        assert_eq!(controller.player.played.len(), 1);
        assert_eq!(controller.arm.calls.last(), Some(&ArmCall::SetPump(false)));
        assert!(controller.arm.polar_moves().is_empty());
        assert!(!controller.state().is_handled(42));
    }
}
