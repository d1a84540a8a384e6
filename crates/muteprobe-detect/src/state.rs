use crate::types::{DetectorState, MuteCallback, TrialOutcome, TrialResolution};
use std::time::{Duration, Instant};

/// Pure bookkeeping for playback-timing trials. Holds everything tracked
/// between a trigger and its resolution; `MuteDetector` wraps one of these in
/// a mutex and does the side effects.
pub struct TrialMachine {
    state: DetectorState,

    seq: u64,

    started_at: Option<Instant>,

    pending: Option<MuteCallback>,

    last_verdict: Option<bool>,

    threshold: Duration,
}

/// What a resolved trial hands back for side effects
pub struct ResolvedTrial {
    pub outcome: TrialOutcome,
    pub callback: Option<MuteCallback>,
}

impl TrialMachine {
    pub fn new(threshold: Duration) -> Self {
        Self {
            state: DetectorState::Idle,
            seq: 0,
            started_at: None,
            pending: None,
            last_verdict: None,
            threshold,
        }
    }

    /// Replace the registered callback. A previous registration that has not
    /// fired yet is dropped without being invoked.
    pub fn register(&mut self, callback: MuteCallback) {
        self.pending = Some(callback);
    }

    /// Begin a trial at `now`. Returns the trial's generation number, or
    /// `None` when a trial is already in flight.
    pub fn begin(&mut self, now: Instant) -> Option<u64> {
        if self.state == DetectorState::Playing {
            return None;
        }
        self.state = DetectorState::Playing;
        self.seq += 1;
        self.started_at = Some(now);
        Some(self.seq)
    }

    /// Resolve trial `generation` from a platform completion at `now`.
    /// Returns `None` for stale generations and when nothing is in flight.
    pub fn complete(&mut self, generation: u64, now: Instant) -> Option<ResolvedTrial> {
        self.resolve(generation, now, TrialResolution::Completed)
    }

    /// Resolve trial `generation` because its watchdog deadline expired
    pub fn expire(&mut self, generation: u64, now: Instant) -> Option<ResolvedTrial> {
        self.resolve(generation, now, TrialResolution::TimedOut)
    }

    fn resolve(
        &mut self,
        generation: u64,
        now: Instant,
        resolution: TrialResolution,
    ) -> Option<ResolvedTrial> {
        if self.state != DetectorState::Playing || generation != self.seq {
            return None;
        }

        self.state = DetectorState::Idle;

        let elapsed = match self.started_at.take() {
            Some(started) => now.duration_since(started),
            None => Duration::ZERO,
        };

        // A suppressed sound "finishes" almost immediately. A timed-out trial
        // told us nothing, so it falls back to not muted.
        let muted = match resolution {
            TrialResolution::Completed => elapsed < self.threshold,
            TrialResolution::TimedOut => false,
        };

        self.last_verdict = Some(muted);

        Some(ResolvedTrial {
            outcome: TrialOutcome {
                muted,
                elapsed,
                resolution,
            },
            callback: self.pending.take(),
        })
    }

    pub fn current_state(&self) -> DetectorState {
        self.state
    }

    pub fn last_verdict(&self) -> Option<bool> {
        self.last_verdict
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }
}
