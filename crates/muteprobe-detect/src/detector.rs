//! Silent-switch detection by timing a probe sound.
//!
//! The platform never reports the hardware silent switch directly, so the
//! detector infers it: play a short UI-category sound and measure how long
//! the platform takes to report completion. A suppressed sound completes
//! almost instantly; an audible one takes its real length. Anything strictly
//! under the configured threshold classifies as muted.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info};

use muteprobe_foundation::{real_clock, ProbeError, SharedClock};

use crate::config::DetectorConfig;
use crate::delivery::{self, DeliveryJob};
use crate::platform::{PlaybackService, SoundHandle, SoundLocator};
use crate::state::{ResolvedTrial, TrialMachine};
use crate::types::{DetectorState, MuteCallback, TrialOutcome};

/// State shared between the detector, platform completion handlers, and the
/// delivery worker. Completion handlers may outlive the detector, so this
/// lives behind an `Arc`.
pub(crate) struct DetectorShared {
    machine: Mutex<TrialMachine>,
    clock: SharedClock,
    outcome_tx: broadcast::Sender<TrialOutcome>,
}

impl DetectorShared {
    /// Resolve trial `generation` from a platform completion. `None` when the
    /// trial was already resolved or superseded.
    pub(crate) fn complete(&self, generation: u64) -> Option<ResolvedTrial> {
        let now = self.clock.now();
        let resolved = self.machine.lock().complete(generation, now)?;
        self.publish(&resolved.outcome);
        Some(resolved)
    }

    /// Resolve trial `generation` from the watchdog. `None` when the platform
    /// completion won the race.
    pub(crate) fn expire(&self, generation: u64) -> Option<ResolvedTrial> {
        let now = self.clock.now();
        let resolved = self.machine.lock().expire(generation, now)?;
        self.publish(&resolved.outcome);
        Some(resolved)
    }

    fn publish(&self, outcome: &TrialOutcome) {
        // Nobody subscribed is fine
        let _ = self.outcome_tx.send(*outcome);
    }
}

/// Detects the position of the hardware silent switch by timing playback of
/// a short probe sound.
///
/// Construction is fail-fast: the probe sound is located, loaded, and tagged
/// as a UI sound up front, and any failure surfaces as an error instead of a
/// detector that can never produce a verdict. Collaborators are injected, so
/// tests drive the detector with scripted platform backends and a manual
/// clock.
///
/// `detect` holds a single callback slot. Calling it again before the
/// previous verdict was delivered replaces the earlier callback, which is
/// then dropped without being invoked. Verdicts are always delivered
/// asynchronously on the detector's own delivery thread.
pub struct MuteDetector {
    playback: Arc<dyn PlaybackService>,
    sound: SoundHandle,
    shared: Arc<DetectorShared>,
    delivery_tx: Sender<DeliveryJob>,
    trial_timeout: Option<Duration>,
    _worker: std::thread::JoinHandle<()>,
}

impl MuteDetector {
    /// Build a detector against the system clock.
    pub fn new(
        locator: Arc<dyn SoundLocator>,
        playback: Arc<dyn PlaybackService>,
        config: DetectorConfig,
    ) -> Result<Self, ProbeError> {
        Self::with_clock(locator, playback, config, real_clock())
    }

    /// Build a detector that samples time through `clock`.
    pub fn with_clock(
        locator: Arc<dyn SoundLocator>,
        playback: Arc<dyn PlaybackService>,
        config: DetectorConfig,
        clock: SharedClock,
    ) -> Result<Self, ProbeError> {
        config.validate()?;

        let path = locator.locate(&config.sound_name)?;
        let sound = playback.load(&path)?;
        if let Err(e) = playback.mark_ui_sound(sound) {
            playback.dispose(sound);
            return Err(e.into());
        }

        let (outcome_tx, _) = broadcast::channel(config.outcome_capacity);
        let shared = Arc::new(DetectorShared {
            machine: Mutex::new(TrialMachine::new(config.threshold())),
            clock,
            outcome_tx,
        });

        let (delivery_tx, delivery_rx) = crossbeam_channel::unbounded();
        let worker = match delivery::spawn_worker(Arc::clone(&shared), delivery_rx) {
            Ok(handle) => handle,
            Err(e) => {
                playback.dispose(sound);
                return Err(ProbeError::Fatal(format!(
                    "failed to spawn delivery worker: {}",
                    e
                )));
            }
        };

        info!(
            "Mute detector ready: sound {:?} at {:?}, threshold {:?}",
            sound,
            path,
            config.threshold()
        );

        Ok(Self {
            playback,
            sound,
            shared,
            delivery_tx,
            trial_timeout: config.trial_timeout(),
            _worker: worker,
        })
    }

    /// Run one trial and deliver the verdict to `callback`.
    ///
    /// The callback lands in the single registration slot, replacing any
    /// earlier callback that has not fired yet. If a trial is already in
    /// flight no new playback starts; the in-flight trial's verdict goes to
    /// the latest registered callback. Never blocks and never invokes the
    /// callback on the calling thread.
    pub fn detect<F>(&self, callback: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.trigger(Some(Box::new(callback)));
    }

    /// Run one trial without registering a callback. Subscribers still
    /// observe the outcome. No-op while a trial is in flight.
    pub fn probe(&self) {
        self.trigger(None);
    }

    fn trigger(&self, callback: Option<MuteCallback>) {
        let begun = {
            let mut machine = self.shared.machine.lock();
            if let Some(callback) = callback {
                machine.register(callback);
            }
            let now = self.shared.clock.now();
            machine.begin(now)
        };

        let Some(generation) = begun else {
            debug!("Trial already in flight, trigger ignored");
            return;
        };

        // Arm before play: if the platform completes inline, the Resolved job
        // must find the worker already ordered against this Arm.
        if let Some(timeout) = self.trial_timeout {
            let _ = self.delivery_tx.send(DeliveryJob::Arm {
                generation,
                deadline: Instant::now() + timeout,
            });
        }

        debug!("Trial #{} started", generation);

        let shared = Arc::clone(&self.shared);
        let delivery_tx = self.delivery_tx.clone();
        self.playback.play(
            self.sound,
            Box::new(move || match shared.complete(generation) {
                Some(resolved) => {
                    debug!(
                        "Trial #{} completed in {:?}, muted={}",
                        generation, resolved.outcome.elapsed, resolved.outcome.muted
                    );
                    let _ = delivery_tx.send(DeliveryJob::Resolved {
                        generation,
                        callback: resolved.callback,
                        muted: resolved.outcome.muted,
                    });
                }
                None => debug!("Stale completion for trial #{} ignored", generation),
            }),
        );
    }

    /// True from trial start until its resolution.
    pub fn is_playing(&self) -> bool {
        self.shared.machine.lock().current_state() == DetectorState::Playing
    }

    /// Verdict of the most recently resolved trial, `None` before the first.
    pub fn last_mute(&self) -> Option<bool> {
        self.shared.machine.lock().last_verdict()
    }

    /// Elapsed-time cutoff used for classification.
    pub fn threshold(&self) -> Duration {
        self.shared.machine.lock().threshold()
    }

    /// Observe every resolved trial, whichever way it was triggered.
    pub fn subscribe(&self) -> broadcast::Receiver<TrialOutcome> {
        self.shared.outcome_tx.subscribe()
    }
}

impl Drop for MuteDetector {
    fn drop(&mut self) {
        self.playback.dispose(self.sound);
        // Dropping delivery_tx disconnects the worker once in-flight
        // completion handlers have dropped their clones; queued verdicts
        // drain before the thread exits.
    }
}
