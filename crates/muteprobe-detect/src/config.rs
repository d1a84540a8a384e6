use std::time::Duration;

use serde::{Deserialize, Serialize};

use muteprobe_foundation::ProbeError;

use super::constants::{
    DEFAULT_CHECK_INTERVAL_MS, DEFAULT_MUTE_THRESHOLD_MS, DEFAULT_SOUND_NAME,
    OUTCOME_CHANNEL_CAPACITY,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Logical asset name handed to the locator
    pub sound_name: String,
    /// Elapsed milliseconds below which a trial classifies as muted (strict `<`)
    pub threshold_ms: u64,
    /// Bounded wait for the platform completion, in milliseconds. `None`
    /// waits forever, so a trial whose completion never arrives stays in
    /// flight indefinitely; when set, a stalled trial resolves with the
    /// fallback verdict "not muted". Must exceed `threshold_ms` and should
    /// comfortably exceed the probe sound's real length.
    pub trial_timeout_ms: Option<u64>,
    /// Capacity of the trial-outcome broadcast channel
    pub outcome_capacity: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sound_name: DEFAULT_SOUND_NAME.to_string(),
            threshold_ms: DEFAULT_MUTE_THRESHOLD_MS,
            trial_timeout_ms: None,
            outcome_capacity: OUTCOME_CHANNEL_CAPACITY,
        }
    }
}

impl DetectorConfig {
    pub fn threshold(&self) -> Duration {
        Duration::from_millis(self.threshold_ms)
    }

    pub fn trial_timeout(&self) -> Option<Duration> {
        self.trial_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ProbeError> {
        if self.sound_name.is_empty() {
            return Err(ProbeError::Config("sound_name must not be empty".to_string()));
        }
        if self.threshold_ms == 0 {
            return Err(ProbeError::Config("threshold_ms must be nonzero".to_string()));
        }
        if let Some(timeout_ms) = self.trial_timeout_ms {
            if timeout_ms <= self.threshold_ms {
                return Err(ProbeError::Config(format!(
                    "trial_timeout_ms ({}) must exceed threshold_ms ({})",
                    timeout_ms, self.threshold_ms
                )));
            }
        }
        if self.outcome_capacity == 0 {
            return Err(ProbeError::Config("outcome_capacity must be nonzero".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Spacing between scheduled probes, in milliseconds. The first probe
    /// fires as soon as the monitor starts.
    pub check_interval_ms: u64,
    /// Forward every trial outcome when true, only verdict changes when false
    pub always_notify: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: DEFAULT_CHECK_INTERVAL_MS,
            always_notify: true,
        }
    }
}

impl MonitorConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }
}
