//! Sequential task execution for one phase.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kiln_core::{Job, Phase};
use tracing::{debug, info};

use crate::context::ExecutionContext;
use crate::error::{TaskError, TaskResult};
use crate::executor::CommandExecutor;
use crate::plugin::JobPlugin;
use crate::provider::SourceProvider;
use crate::reporter::JobReporter;

/// Runs the ordered task list of one phase.
///
/// During prepare the provider's clone operation comes first; after that the
/// configured plugins run in configuration order, one awaited at a time, so
/// later plugins can rely on the side effects of earlier ones. The first
/// error stops the phase: remaining tasks never run.
pub struct PhaseRunner {
    job: Arc<Job>,
    workdir: PathBuf,
    base_env: HashMap<String, String>,
    command_timeout: Option<Duration>,
    reporter: JobReporter,
    provider: Arc<dyn SourceProvider>,
    plugins: Vec<Arc<dyn JobPlugin>>,
}

impl PhaseRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        job: Arc<Job>,
        workdir: PathBuf,
        base_env: HashMap<String, String>,
        command_timeout: Option<Duration>,
        reporter: JobReporter,
        provider: Arc<dyn SourceProvider>,
        plugins: Vec<Arc<dyn JobPlugin>>,
    ) -> Self {
        Self {
            job,
            workdir,
            base_env,
            command_timeout,
            reporter,
            provider,
            plugins,
        }
    }

    /// Immutable context for one phase. Rebuilt per phase; tasks only read
    /// it.
    fn context(&self, phase: Phase) -> ExecutionContext {
        let executor = CommandExecutor::new(
            self.workdir.clone(),
            self.base_env.clone(),
            self.reporter.clone(),
            self.command_timeout,
        );
        ExecutionContext {
            job: Arc::clone(&self.job),
            phase,
            workdir: self.workdir.clone(),
            reporter: self.reporter.clone(),
            executor,
        }
    }

    /// Run one phase to completion or to its first error.
    pub async fn run(&self, phase: Phase) -> TaskResult<()> {
        let ctx = self.context(phase);
        info!(job_id = %self.job.id, phase = %phase, "phase started");

        if phase == Phase::Prepare {
            if self.reporter.is_cancelled() {
                return Err(TaskError::Canceled);
            }
            debug!(
                job_id = %self.job.id,
                provider = %self.provider.name(),
                "acquiring source"
            );
            self.provider.clone_source(&ctx).await?;
        }

        for plugin in &self.plugins {
            if !plugin.handles(phase) {
                continue;
            }
            if self.reporter.is_cancelled() {
                return Err(TaskError::Canceled);
            }
            debug!(
                job_id = %self.job.id,
                phase = %phase,
                plugin = %plugin.name(),
                "running plugin task"
            );
            plugin.run(&ctx).await?;
        }

        Ok(())
    }
}
