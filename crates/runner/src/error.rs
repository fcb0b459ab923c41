use std::time::Duration;

use thiserror::Error;

/// Failure of one task: a provider clone, a plugin handler, or a command
/// run on their behalf.
///
/// The engine routes on the shape of the error: exit-code failures (and the
/// bounded-wait timeout) send the job to cleanup, anything else terminates
/// it without a cleanup pass.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The task's process completed with a non-zero exit.
    #[error("exited with code {0}")]
    ExitCode(i32),

    /// A command exceeded the configured bounded wait and was killed.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The job was cancelled before or during the task. Not a failure;
    /// halts the runner silently.
    #[error("job cancelled")]
    Canceled,

    /// Anything not recognized as a process exit. `server_only` errors stay
    /// in the diagnostic sink and never reach the status stream.
    #[error("{message}")]
    Fatal { message: String, server_only: bool },
}

impl TaskError {
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal {
            message: message.into(),
            server_only: false,
        }
    }

    /// A fatal error whose detail must not leak to end users.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Fatal {
            message: message.into(),
            server_only: true,
        }
    }

    /// The numeric exit code, for well-formed exit-code failures only.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ExitCode(code) => Some(*code),
            _ => None,
        }
    }

    /// Whether the job still gets a cleanup pass after this error.
    pub fn recoverable(&self) -> bool {
        matches!(self, Self::ExitCode(_) | Self::Timeout(_))
    }

    /// Exit code to report on the status stream for a recoverable failure.
    pub fn report_code(&self) -> i32 {
        self.exit_code().unwrap_or(-1)
    }

    pub fn server_only(&self) -> bool {
        matches!(self, Self::Fatal { server_only: true, .. })
    }
}

impl From<std::io::Error> for TaskError {
    fn from(err: std::io::Error) -> Self {
        Self::fatal(err.to_string())
    }
}

impl From<kiln_core::CoreError> for TaskError {
    fn from(err: kiln_core::CoreError) -> Self {
        Self::fatal(err.to_string())
    }
}

pub type TaskResult<T> = std::result::Result<T, TaskError>;

/// Configuration-time validation failure: the job references a capability
/// that was never registered.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}
