//! Command execution with live output streaming.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use chrono::Utc;
use events::Event;
use kiln_core::{CommandResult, CommandSpec};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{TaskError, TaskResult};
use crate::reporter::{JobReporter, OutputKind};

/// Runs external commands for one job.
///
/// Holds the job defaults (working directory, merged environment); a
/// command's own `env`/`cwd` override them. Output is streamed onto the
/// status stream as it arrives, preserving live-tail semantics.
#[derive(Clone)]
pub struct CommandExecutor {
    workdir: PathBuf,
    base_env: HashMap<String, String>,
    reporter: JobReporter,
    timeout: Option<Duration>,
}

impl CommandExecutor {
    pub fn new(
        workdir: PathBuf,
        base_env: HashMap<String, String>,
        reporter: JobReporter,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            workdir,
            base_env,
            reporter,
            timeout,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run one command to completion.
    ///
    /// Emits `command.start` before spawning, `stdout`/`stderr` chunks as
    /// they arrive, and `command.done` carrying the exit code and duration.
    /// Returns the result regardless of exit code; the caller decides
    /// whether a non-zero exit fails its task. No retries at this layer.
    pub async fn run(&self, spec: impl Into<CommandSpec>) -> TaskResult<CommandResult> {
        let spec = spec.into();
        if self.reporter.is_cancelled() {
            return Err(TaskError::Canceled);
        }

        let (program, args) = spec.resolve()?;
        let started_at = Utc::now();
        let started = Instant::now();

        self.reporter.status(Event::CommandStart {
            job_id: self.reporter.job_id(),
            display: spec.display_line(),
            started_at,
        });

        let cwd = spec.cwd.clone().unwrap_or_else(|| self.workdir.clone());
        let mut command = Command::new(&program);
        command
            .args(&args)
            .envs(&self.base_env)
            .envs(&spec.env)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Own process group, so the command can be addressed independently
        // of the runner.
        #[cfg(unix)]
        command.process_group(0);

        debug!(
            job_id = %self.reporter.job_id(),
            program = %program,
            cwd = %cwd.display(),
            "spawning command"
        );

        let mut child = command
            .spawn()
            .map_err(|e| TaskError::fatal(format!("failed to spawn {program}: {e}")))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let wait = async {
            let (_, _, status) = tokio::join!(
                pump(stdout, self.reporter.clone(), OutputKind::Stdout),
                pump(stderr, self.reporter.clone(), OutputKind::Stderr),
                child.wait(),
            );
            status
        };

        let waited = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, wait).await,
            None => Ok(wait.await),
        };

        let status = match waited {
            Ok(status) => status,
            Err(_) => {
                warn!(
                    job_id = %self.reporter.job_id(),
                    program = %program,
                    elapsed = ?started.elapsed(),
                    "command timed out, killing"
                );
                child.kill().await.ok();
                self.reporter.status(Event::CommandDone {
                    job_id: self.reporter.job_id(),
                    exit_code: -1,
                    finished_at: Utc::now(),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                });
                return Err(TaskError::Timeout(self.timeout.unwrap_or_default()));
            }
        };

        let status =
            status.map_err(|e| TaskError::fatal(format!("failed waiting on {program}: {e}")))?;

        let elapsed = started.elapsed();
        let finished_at = Utc::now();
        // Killed-by-signal has no exit code; report it as -1.
        let exit_code = status.code().unwrap_or(-1);

        self.reporter.status(Event::CommandDone {
            job_id: self.reporter.job_id(),
            exit_code,
            finished_at,
            elapsed_ms: elapsed.as_millis() as u64,
        });

        debug!(
            job_id = %self.reporter.job_id(),
            program = %program,
            exit_code,
            elapsed_ms = elapsed.as_millis() as u64,
            "command finished"
        );

        Ok(CommandResult {
            exit_code,
            started_at,
            finished_at,
            elapsed,
        })
    }
}

/// Forward a child pipe onto the status stream, chunk by chunk, until EOF.
async fn pump<R>(pipe: Option<R>, reporter: JobReporter, kind: OutputKind)
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return;
    };
    let mut buf = [0u8; 4096];
    loop {
        match pipe.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                reporter.out(&String::from_utf8_lossy(&buf[..n]), kind);
            }
        }
    }
}
