//! Per-job cancellation: a write-once flag and the id-keyed registry that
//! inbound cancel signals are delivered to.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use events::{Event, EventBus, EventEnvelope};
use tracing::{debug, info};
use uuid::Uuid;

/// Write-once cancellation flag shared by everything working on one job.
///
/// Once set it is never cleared; readers check it before every externally
/// observable action.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Returns true only for the call that flipped it.
    pub fn cancel(&self) -> bool {
        !self.flag.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Job id → cancellation token.
///
/// Inbound cancel requests are looked up and signalled directly by id; there
/// is no broadcast-and-filter. Tokens handed out stay valid after removal,
/// so in-flight work still observes the flag.
pub struct CancellationRegistry {
    jobs: Mutex<HashMap<Uuid, CancelToken>>,
    bus: EventBus,
}

impl CancellationRegistry {
    pub fn new(bus: EventBus) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            bus,
        }
    }

    /// Token for the given job, created on first use.
    pub fn register(&self, job_id: Uuid) -> CancelToken {
        self.jobs
            .lock()
            .expect("cancellation registry lock poisoned")
            .entry(job_id)
            .or_default()
            .clone()
    }

    /// Cancel a registered job.
    ///
    /// Publishes `job.cancelled` exactly once per job; repeat signals and
    /// unknown ids are no-ops returning false.
    pub fn cancel(&self, job_id: Uuid) -> bool {
        let token = self
            .jobs
            .lock()
            .expect("cancellation registry lock poisoned")
            .get(&job_id)
            .cloned();

        match token {
            Some(token) if token.cancel() => {
                info!(job_id = %job_id, "job cancelled");
                self.bus.publish(EventEnvelope::new(Event::JobCancelled { job_id }));
                true
            }
            Some(_) => false,
            None => {
                debug!(job_id = %job_id, "cancel for unknown job ignored");
                false
            }
        }
    }

    /// Drop the registry entry once a job has finished.
    pub fn remove(&self, job_id: Uuid) {
        self.jobs
            .lock()
            .expect("cancellation registry lock poisoned")
            .remove(&job_id);
    }
}
