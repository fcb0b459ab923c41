//! Phase transition rules.

use kiln_core::{JobType, Phase};

/// Owns the phase order and failure routing for one job.
///
/// The nominal order is env → prepare → test → deploy → cleanup. Deploy is
/// skipped outright for non-deploy jobs, never entered as a no-op. Any
/// non-zero exit reroutes the job to cleanup; a failure inside cleanup ends
/// the job instead of looping.
#[derive(Debug, Clone, Copy)]
pub struct PhaseMachine {
    deploys: bool,
}

impl PhaseMachine {
    pub fn new(job_type: JobType) -> Self {
        Self {
            deploys: job_type.deploys(),
        }
    }

    /// The phase every job starts in.
    pub fn first(&self) -> Phase {
        Phase::Env
    }

    /// Nominal successor after a successful phase; `None` means done.
    pub fn next_on_success(&self, phase: Phase) -> Option<Phase> {
        match phase {
            Phase::Env => Some(Phase::Prepare),
            Phase::Prepare => Some(Phase::Test),
            Phase::Test if self.deploys => Some(Phase::Deploy),
            Phase::Test => Some(Phase::Cleanup),
            Phase::Deploy => Some(Phase::Cleanup),
            Phase::Cleanup => None,
        }
    }

    /// Successor after a non-zero exit.
    pub fn next_on_failure(&self, phase: Phase) -> Option<Phase> {
        match phase {
            Phase::Cleanup => None,
            _ => Some(Phase::Cleanup),
        }
    }
}
