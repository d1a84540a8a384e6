//! Core types shared across the detection pipeline

use std::time::Duration;

/// Trial lifecycle of a detector instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// No trial in flight, ready to play the probe sound
    Idle,
    /// Probe sound requested, waiting for the platform completion
    Playing,
}

impl Default for DetectorState {
    fn default() -> Self {
        Self::Idle
    }
}

/// How a trial reached its verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialResolution {
    /// The platform reported playback completion
    Completed,
    /// The watchdog deadline expired before any completion arrived
    TimedOut,
}

/// Result of one play-and-measure trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialOutcome {
    /// True when the elapsed time says the switch suppressed the sound
    pub muted: bool,
    /// Time between requesting playback and resolving the trial
    pub elapsed: Duration,
    /// Whether the platform completed or the watchdog fired
    pub resolution: TrialResolution,
}

/// One-shot verdict callback registered through `MuteDetector::detect`
pub type MuteCallback = Box<dyn FnOnce(bool) + Send + 'static>;
