//! Fixed parameters of the playback-timing heuristic

/// Elapsed-time cutoff for classifying a trial as muted (milliseconds).
/// A suppressed UI sound completes in single-digit milliseconds while the
/// shortest audible probe sound takes a few hundred, so anything strictly
/// under this cutoff means the switch swallowed the sound.
pub const DEFAULT_MUTE_THRESHOLD_MS: u64 = 100;

/// Logical name of the probe sound asset, resolved through the locator
pub const DEFAULT_SOUND_NAME: &str = "mute";

/// Default spacing between scheduled probes when monitoring (milliseconds)
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 1000;

/// Default capacity of the trial-outcome broadcast channel
pub const OUTCOME_CHANNEL_CAPACITY: usize = 16;
