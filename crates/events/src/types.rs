//! Event types published by running jobs.

use chrono::{DateTime, Utc};
use kiln_core::Phase;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping all events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: Event,
}

impl EventEnvelope {
    /// Create a new event envelope with auto-generated ID and timestamp
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// All events a job publishes. The job id is always present as the
/// correlation key for observers following a single job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Cancellation acknowledged; nothing further will be published for
    /// this job.
    #[serde(rename = "job.cancelled")]
    JobCancelled { job_id: Uuid },

    /// A command began. `display` is the human-readable command line,
    /// already redacted when the caller supplied a screen string.
    #[serde(rename = "job.status.command.start")]
    CommandStart {
        job_id: Uuid,
        display: String,
        started_at: DateTime<Utc>,
    },

    /// A command finished.
    #[serde(rename = "job.status.command.done")]
    CommandDone {
        job_id: Uuid,
        exit_code: i32,
        finished_at: DateTime<Utc>,
        elapsed_ms: u64,
    },

    /// Live chunk of a command's standard output.
    #[serde(rename = "job.status.stdout")]
    Stdout { job_id: Uuid, chunk: String },

    /// Live chunk of a command's standard error (also carries sanitized
    /// engine error text).
    #[serde(rename = "job.status.stderr")]
    Stderr { job_id: Uuid, chunk: String },

    /// A phase finished, successfully or with the given exit code.
    #[serde(rename = "job.status.phase.done")]
    PhaseDone {
        job_id: Uuid,
        phase: Phase,
        exit_code: i32,
        finished_at: DateTime<Utc>,
    },
}

impl Event {
    /// The job this event belongs to.
    pub fn job_id(&self) -> Uuid {
        match self {
            Event::JobCancelled { job_id }
            | Event::CommandStart { job_id, .. }
            | Event::CommandDone { job_id, .. }
            | Event::Stdout { job_id, .. }
            | Event::Stderr { job_id, .. }
            | Event::PhaseDone { job_id, .. } => *job_id,
        }
    }

    /// The dotted wire name for this event, with the phase interpolated for
    /// phase completions (`job.status.test.done`, `job.status.cleanup.done`).
    pub fn channel(&self) -> String {
        match self {
            Event::JobCancelled { .. } => "job.cancelled".to_string(),
            Event::CommandStart { .. } => "job.status.command.start".to_string(),
            Event::CommandDone { .. } => "job.status.command.done".to_string(),
            Event::Stdout { .. } => "job.status.stdout".to_string(),
            Event::Stderr { .. } => "job.status.stderr".to_string(),
            Event::PhaseDone { phase, .. } => format!("job.status.{}.done", phase.as_str()),
        }
    }
}
