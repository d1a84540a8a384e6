//! Silent-switch detection from playback timing.
//!
//! The host platform exposes no API for the hardware ring/silent switch.
//! This crate infers its position: `MuteDetector` plays a short UI-category
//! probe sound through an injected platform backend and measures how long
//! the platform takes to report completion. A sound the switch suppressed
//! completes almost instantly; an audible one takes its real length.
//! `MuteMonitor` layers scheduled re-checking on top of a shared detector.

pub mod config;
pub mod constants;
mod delivery;
pub mod detector;
pub mod monitor;
pub mod platform;
pub mod state;
pub mod types;

// Core exports - grouped and sorted alphabetically
pub use config::{DetectorConfig, MonitorConfig};
pub use constants::{DEFAULT_CHECK_INTERVAL_MS, DEFAULT_MUTE_THRESHOLD_MS, DEFAULT_SOUND_NAME};
pub use detector::MuteDetector;
pub use monitor::MuteMonitor;
pub use platform::{CompletionHandler, PlaybackService, SoundHandle, SoundLocator};
pub use types::{DetectorState, MuteCallback, TrialOutcome, TrialResolution};

// Foundation types that appear in this crate's public API
pub use muteprobe_foundation::{
    Clock, ManualClock, PlaybackError, ProbeError, RealClock, ResourceError, SharedClock,
};
