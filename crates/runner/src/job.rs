//! Top-level job controller.

use std::sync::Arc;

use chrono::Utc;
use events::Event;
use kiln_core::Job;
use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::config::RunnerContext;
use crate::error::{ConfigError, TaskError};
use crate::phase_runner::PhaseRunner;
use crate::reporter::JobReporter;
use crate::state_machine::PhaseMachine;

/// How a job run ended.
///
/// This is the engine's rendition of the at-most-once completion callback:
/// `run` consumes the runner and returns exactly one outcome, and a
/// cancelled job reports no completion at all.
#[derive(Debug)]
pub enum JobOutcome {
    /// Cleanup finished. Exit-code failures along the way were reported
    /// through the status stream, not here.
    Completed,
    /// A fatal (non-exit-code) error terminated the job; cleanup did not
    /// run.
    Fatal(TaskError),
    /// The job was cancelled; nothing further was emitted.
    Cancelled,
}

/// Drives a single job through its phases.
pub struct JobRunner {
    job: Arc<Job>,
    ctx: Arc<RunnerContext>,
    phase_runner: PhaseRunner,
    reporter: JobReporter,
    token: CancelToken,
}

impl JobRunner {
    /// Validate the job against the configured registries and set up its
    /// collaborators. Unknown plugin or provider names fail here, before
    /// any phase runs or any event is published.
    pub fn new(job: Job, ctx: Arc<RunnerContext>) -> Result<Self, ConfigError> {
        let provider = ctx.providers.resolve(&job)?;
        let plugins = ctx.plugins.resolve(&job)?;

        let job = Arc::new(job);
        let token = ctx.cancellations.register(job.id);
        let reporter = JobReporter::new(
            job.id,
            ctx.bus.clone(),
            token.clone(),
            Arc::clone(&ctx.messages),
        );

        // The working directory is derived here; creating it is the
        // caller's concern.
        let workdir = job.workdir(&ctx.config.data_root);

        let mut base_env = ctx.config.base_env.clone();
        base_env.extend(job.env.clone());

        let phase_runner = PhaseRunner::new(
            Arc::clone(&job),
            workdir,
            base_env,
            ctx.config.command_timeout,
            reporter.clone(),
            provider,
            plugins,
        );

        Ok(Self {
            job,
            ctx,
            phase_runner,
            reporter,
            token,
        })
    }

    /// Run the job to its one outcome.
    pub async fn run(self) -> JobOutcome {
        info!(
            job_id = %self.job.id,
            repo = %self.job.repo.name,
            job_type = %self.job.job_type.as_str(),
            "job started"
        );

        let outcome = self.drive().await;
        self.ctx.cancellations.remove(self.job.id);

        match &outcome {
            JobOutcome::Completed => info!(job_id = %self.job.id, "job completed"),
            JobOutcome::Fatal(err) => {
                warn!(job_id = %self.job.id, error = %err, "job terminated without cleanup")
            }
            JobOutcome::Cancelled => {
                info!(job_id = %self.job.id, "job cancelled, no completion reported")
            }
        }
        outcome
    }

    async fn drive(&self) -> JobOutcome {
        let machine = PhaseMachine::new(self.job.job_type);
        let mut phase = machine.first();

        loop {
            if self.token.is_cancelled() {
                return JobOutcome::Cancelled;
            }

            let result = self.phase_runner.run(phase).await;

            // Cancellation observed before a transition aborts silently.
            if self.token.is_cancelled() {
                return JobOutcome::Cancelled;
            }

            match result {
                Ok(()) => {
                    self.reporter.status(Event::PhaseDone {
                        job_id: self.job.id,
                        phase,
                        exit_code: 0,
                        finished_at: Utc::now(),
                    });
                    match machine.next_on_success(phase) {
                        Some(next) => phase = next,
                        None => return JobOutcome::Completed,
                    }
                }
                Err(TaskError::Canceled) => return JobOutcome::Cancelled,
                Err(err) if err.recoverable() => {
                    let code = err.report_code();
                    warn!(
                        job_id = %self.job.id,
                        phase = %phase,
                        code,
                        "phase failed, routing to cleanup"
                    );
                    self.reporter.status(Event::PhaseDone {
                        job_id: self.job.id,
                        phase,
                        exit_code: code,
                        finished_at: Utc::now(),
                    });
                    match machine.next_on_failure(phase) {
                        Some(next) => phase = next,
                        None => return JobOutcome::Completed,
                    }
                }
                Err(err) => {
                    self.reporter
                        .error(&format!("{phase} phase failed"), &err);
                    return JobOutcome::Fatal(err);
                }
            }
        }
    }
}
