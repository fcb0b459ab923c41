//! Status emitter for one job.

use std::sync::Arc;

use events::{Event, EventBus, EventEnvelope};
use tracing::{debug, error};
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::error::TaskError;
use crate::messages::Messages;

/// Which logical stream a piece of output belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Stdout,
    Stderr,
    Warn,
    Error,
}

impl OutputKind {
    fn error_like(&self) -> bool {
        matches!(self, Self::Stderr | Self::Warn | Self::Error)
    }
}

/// Publishes status events scoped to one job id, suppressed entirely once
/// the job is cancelled. Cheap to clone.
#[derive(Clone)]
pub struct JobReporter {
    job_id: Uuid,
    bus: EventBus,
    cancel: CancelToken,
    messages: Arc<Messages>,
}

impl JobReporter {
    pub fn new(job_id: Uuid, bus: EventBus, cancel: CancelToken, messages: Arc<Messages>) -> Self {
        Self {
            job_id,
            bus,
            cancel,
            messages,
        }
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Publish a status event. No-op returning false once the job is
    /// cancelled.
    pub fn status(&self, event: Event) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.bus.publish(EventEnvelope::new(event));
        true
    }

    /// Route output text onto the matching status stream: warn/error-like
    /// kinds land on stderr, everything else on stdout.
    pub fn out(&self, text: &str, kind: OutputKind) -> bool {
        let chunk = text.to_string();
        let event = if kind.error_like() {
            Event::Stderr {
                job_id: self.job_id,
                chunk,
            }
        } else {
            Event::Stdout {
                job_id: self.job_id,
                chunk,
            }
        };
        self.status(event)
    }

    /// Private diagnostic path; never reaches the status stream.
    pub fn log(&self, message: &str) {
        debug!(job_id = %self.job_id, "{message}");
    }

    /// Record an error: full detail goes to the diagnostic sink, and a
    /// sanitized line is published on the stderr stream unless the error is
    /// marked server-only.
    pub fn error(&self, context: &str, err: &TaskError) {
        error!(job_id = %self.job_id, context, error = %err, "job error");
        if !err.server_only() {
            let text = format!("{}: {}\n", context, self.messages.get("job.fatal"));
            self.out(&text, OutputKind::Error);
        }
    }
}
