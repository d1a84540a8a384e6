//! Scheduled mute checking on top of a shared detector.
//!
//! Probes on a fixed interval and forwards trial outcomes to a status
//! channel, either every trial or only when the verdict changes. The
//! detector's single-slot `detect` path stays untouched; the monitor drives
//! trials through `probe` and observes them through `subscribe`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::detector::MuteDetector;
use crate::types::TrialOutcome;

pub struct MuteMonitor {
    running: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MuteMonitor {
    /// Spawn the monitoring task on the current Tokio runtime. The first
    /// probe fires immediately, then once per configured interval.
    pub fn spawn(
        detector: Arc<MuteDetector>,
        config: MonitorConfig,
        status_tx: Sender<TrialOutcome>,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let paused = Arc::new(AtomicBool::new(false));

        let task_running = Arc::clone(&running);
        let task_paused = Arc::clone(&paused);

        let handle = tokio::spawn(async move {
            info!(
                "Mute monitor started: interval {:?}, always_notify={}",
                config.check_interval(),
                config.always_notify
            );

            let mut outcomes = detector.subscribe();
            let mut ticker = tokio::time::interval(config.check_interval());
            let mut last_forwarded: Option<bool> = None;
            let mut probes_triggered: u64 = 0;
            let mut outcomes_forwarded: u64 = 0;

            while task_running.load(Ordering::SeqCst) {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !task_paused.load(Ordering::SeqCst) {
                            detector.probe();
                            probes_triggered += 1;
                        }
                    }
                    received = outcomes.recv() => match received {
                        Ok(outcome) => {
                            let changed = last_forwarded != Some(outcome.muted);
                            last_forwarded = Some(outcome.muted);
                            if config.always_notify || changed {
                                if status_tx.send(outcome).await.is_err() {
                                    debug!("Status receiver dropped, mute monitor stopping");
                                    break;
                                }
                                outcomes_forwarded += 1;
                            }
                        }
                        Err(RecvError::Lagged(missed)) => {
                            warn!("Mute monitor lagged, {} outcomes dropped", missed);
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }

            info!(
                "Mute monitor shutting down. Probes triggered: {}, outcomes forwarded: {}",
                probes_triggered, outcomes_forwarded
            );
        });

        Self {
            running,
            paused,
            handle: Some(handle),
        }
    }

    /// Suspend scheduled probing without tearing the task down. Outcomes of
    /// trials triggered elsewhere are still forwarded.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Resume scheduled probing.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Stop the monitoring task.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for MuteMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
