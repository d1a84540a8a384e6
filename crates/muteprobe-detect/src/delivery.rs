//! Verdict delivery thread and stalled-trial watchdog.
//!
//! Every registered callback fires on one dedicated worker thread, never on
//! the caller of `detect` and never on whatever thread the platform reports
//! completion from. The same thread doubles as the watchdog: while a bounded
//! trial is in flight it waits for jobs with a deadline instead of blocking
//! forever, and an expired deadline resolves the trial with the fallback
//! verdict.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, warn};

use crate::detector::DetectorShared;
use crate::types::MuteCallback;

pub(crate) enum DeliveryJob {
    /// A trial resolved; disarm its deadline and fire the callback if any
    Resolved {
        generation: u64,
        callback: Option<MuteCallback>,
        muted: bool,
    },
    /// A bounded trial started; expire it at `deadline` unless resolved first
    Arm { generation: u64, deadline: Instant },
}

pub(crate) fn spawn_worker(
    shared: Arc<DetectorShared>,
    jobs: Receiver<DeliveryJob>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("muteprobe-delivery".to_string())
        .spawn(move || run(shared, jobs))
}

fn run(shared: Arc<DetectorShared>, jobs: Receiver<DeliveryJob>) {
    let mut armed: Option<(u64, Instant)> = None;

    loop {
        let job = match armed {
            Some((generation, deadline)) => match jobs.recv_deadline(deadline) {
                Ok(job) => job,
                Err(RecvTimeoutError::Timeout) => {
                    armed = None;
                    expire(&shared, generation);
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match jobs.recv() {
                Ok(job) => job,
                Err(_) => break,
            },
        };

        match job {
            DeliveryJob::Resolved {
                generation,
                callback,
                muted,
            } => {
                if armed.map_or(false, |(g, _)| g == generation) {
                    armed = None;
                }
                if let Some(callback) = callback {
                    callback(muted);
                }
            }
            DeliveryJob::Arm {
                generation,
                deadline,
            } => {
                armed = Some((generation, deadline));
            }
        }
    }

    debug!("Delivery worker exited");
}

fn expire(shared: &DetectorShared, generation: u64) {
    match shared.expire(generation) {
        Some(resolved) => {
            warn!(
                "Trial #{} produced no completion before its deadline, assuming not muted",
                generation
            );
            if let Some(callback) = resolved.callback {
                callback(resolved.outcome.muted);
            }
        }
        None => debug!(
            "Watchdog fired for already-resolved trial #{}, nothing to do",
            generation
        ),
    }
}
