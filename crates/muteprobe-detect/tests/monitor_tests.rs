//! Tests for scheduled mute monitoring
//!
//! Tests cover:
//! - Immediate first probe and interval-driven re-probing
//! - always_notify vs change-only forwarding
//! - Pause/resume semantics
//! - Stop tearing the task down
//! - Forwarding of externally triggered trials

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use muteprobe_detect::config::{DetectorConfig, MonitorConfig};
use muteprobe_detect::detector::MuteDetector;
use muteprobe_detect::monitor::MuteMonitor;
use muteprobe_detect::platform::{CompletionHandler, PlaybackService, SoundHandle, SoundLocator};
use muteprobe_detect::types::TrialOutcome;
use muteprobe_foundation::{ManualClock, PlaybackError, ResourceError};

/// Playback backend that completes every play inline after advancing the
/// virtual clock by the next scripted duration. Once the script runs out it
/// repeats the fallback duration forever.
struct ScriptedPlayback {
    clock: Arc<ManualClock>,
    script: Mutex<VecDeque<Duration>>,
    fallback: Duration,
}

impl PlaybackService for ScriptedPlayback {
    fn load(&self, _path: &Path) -> Result<SoundHandle, PlaybackError> {
        Ok(SoundHandle(1))
    }

    fn mark_ui_sound(&self, _handle: SoundHandle) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn play(&self, _handle: SoundHandle, on_complete: CompletionHandler) {
        let elapsed = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);
        self.clock.advance(elapsed);
        on_complete();
    }

    fn dispose(&self, _handle: SoundHandle) {}
}

struct FixedLocator;

impl SoundLocator for FixedLocator {
    fn locate(&self, name: &str) -> Result<PathBuf, ResourceError> {
        Ok(PathBuf::from(format!("/sounds/{}.aiff", name)))
    }
}

fn scripted_detector(script_ms: &[u64], fallback_ms: u64) -> Arc<MuteDetector> {
    let clock = Arc::new(ManualClock::new());
    let playback = Arc::new(ScriptedPlayback {
        clock: clock.clone(),
        script: Mutex::new(script_ms.iter().map(|ms| Duration::from_millis(*ms)).collect()),
        fallback: Duration::from_millis(fallback_ms),
    });
    let detector =
        MuteDetector::with_clock(Arc::new(FixedLocator), playback, DetectorConfig::default(), clock)
            .expect("detector construction should succeed");
    Arc::new(detector)
}

fn monitor_config(interval_ms: u64, always_notify: bool) -> MonitorConfig {
    MonitorConfig {
        check_interval_ms: interval_ms,
        always_notify,
    }
}

async fn next_outcome(rx: &mut mpsc::Receiver<TrialOutcome>, within: Duration) -> Option<TrialOutcome> {
    timeout(within, rx.recv()).await.ok().flatten()
}

#[tokio::test]
async fn monitor_probes_immediately_and_then_on_interval() {
    // 30ms completions: every trial classifies as muted
    let detector = scripted_detector(&[], 30);
    let (status_tx, mut status_rx) = mpsc::channel(16);
    let mut monitor = MuteMonitor::spawn(detector, monitor_config(500, true), status_tx);

    // First probe fires at startup, well before the 500ms interval elapses
    let first = next_outcome(&mut status_rx, Duration::from_millis(250)).await;
    assert!(first.expect("first probe should fire immediately").muted);

    monitor.stop();
}

#[tokio::test]
async fn monitor_forwards_every_outcome_when_always_notify() {
    let detector = scripted_detector(&[], 30);
    let (status_tx, mut status_rx) = mpsc::channel(16);
    let mut monitor = MuteMonitor::spawn(detector, monitor_config(25, true), status_tx);

    let mut received = Vec::new();
    while received.len() < 3 {
        match next_outcome(&mut status_rx, Duration::from_secs(2)).await {
            Some(outcome) => received.push(outcome),
            None => break,
        }
    }

    // Identical repeated verdicts still come through
    assert_eq!(received.len(), 3);
    assert!(received.iter().all(|outcome| outcome.muted));

    monitor.stop();
}

#[tokio::test]
async fn monitor_forwards_only_changes_when_configured() {
    // muted, muted, audible, audible, muted, then audible forever
    let detector = scripted_detector(&[30, 30, 300, 300, 30], 300);
    let (status_tx, mut status_rx) = mpsc::channel(16);
    let mut monitor = MuteMonitor::spawn(detector, monitor_config(20, false), status_tx);

    let mut verdicts = Vec::new();
    while verdicts.len() < 4 {
        match next_outcome(&mut status_rx, Duration::from_secs(2)).await {
            Some(outcome) => verdicts.push(outcome.muted),
            None => break,
        }
    }

    // Repeats are filtered, only transitions arrive
    assert_eq!(verdicts, vec![true, false, true, false]);

    monitor.stop();
}

#[tokio::test]
async fn monitor_pause_suspends_probing_and_resume_restarts_it() {
    let detector = scripted_detector(&[], 30);
    let (status_tx, mut status_rx) = mpsc::channel(16);
    let mut monitor = MuteMonitor::spawn(detector, monitor_config(20, true), status_tx);

    assert!(next_outcome(&mut status_rx, Duration::from_secs(2)).await.is_some());
    assert!(!monitor.is_paused());

    monitor.pause();
    assert!(monitor.is_paused());

    // Drain whatever was already in flight when pause landed
    while next_outcome(&mut status_rx, Duration::from_millis(60)).await.is_some() {}

    // Paused: several intervals pass without a probe
    assert!(next_outcome(&mut status_rx, Duration::from_millis(200)).await.is_none());

    monitor.resume();
    assert!(!monitor.is_paused());
    assert!(next_outcome(&mut status_rx, Duration::from_secs(2)).await.is_some());

    monitor.stop();
}

#[tokio::test]
async fn monitor_stop_ends_forwarding() {
    let detector = scripted_detector(&[], 30);
    let (status_tx, mut status_rx) = mpsc::channel(16);
    let mut monitor = MuteMonitor::spawn(detector, monitor_config(20, true), status_tx);

    assert!(next_outcome(&mut status_rx, Duration::from_secs(2)).await.is_some());

    monitor.stop();

    // The task owned the sender; the channel closes once it is gone
    let closed = timeout(Duration::from_secs(2), async {
        while status_rx.recv().await.is_some() {}
    })
    .await;
    assert!(closed.is_ok());
}

#[tokio::test]
async fn monitor_forwards_external_trials_while_paused() {
    let detector = scripted_detector(&[], 30);
    let (status_tx, mut status_rx) = mpsc::channel(16);
    let mut monitor = MuteMonitor::spawn(Arc::clone(&detector), monitor_config(20, true), status_tx);

    monitor.pause();
    while next_outcome(&mut status_rx, Duration::from_millis(60)).await.is_some() {}

    // A trial triggered outside the monitor is still observed and forwarded
    detector.probe();
    let outcome = next_outcome(&mut status_rx, Duration::from_secs(2)).await;
    assert!(outcome.expect("externally triggered outcome should be forwarded").muted);

    monitor.stop();
}
