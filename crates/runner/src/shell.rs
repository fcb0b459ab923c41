//! Built-in plugin running configured shell commands.

use std::collections::HashMap;

use async_trait::async_trait;
use kiln_core::{CommandSpec, Phase};

use crate::context::ExecutionContext;
use crate::error::{TaskError, TaskResult};
use crate::plugin::JobPlugin;

/// Runs a configured list of shell commands in each phase it is attached
/// to. The first non-zero exit fails the phase with that code.
#[derive(Default)]
pub struct ShellCommands {
    commands: HashMap<Phase, Vec<CommandSpec>>,
}

impl ShellCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach commands to a phase, appended in order.
    pub fn on<I, C>(mut self, phase: Phase, commands: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CommandSpec>,
    {
        self.commands
            .entry(phase)
            .or_default()
            .extend(commands.into_iter().map(Into::into));
        self
    }
}

#[async_trait]
impl JobPlugin for ShellCommands {
    fn name(&self) -> &str {
        "shell"
    }

    fn handles(&self, phase: Phase) -> bool {
        self.commands.contains_key(&phase)
    }

    async fn run(&self, ctx: &ExecutionContext) -> TaskResult<()> {
        let Some(specs) = self.commands.get(&ctx.phase) else {
            return Ok(());
        };
        for spec in specs {
            let result = ctx.executor.run(spec.clone()).await?;
            result.check().map_err(TaskError::ExitCode)?;
        }
        Ok(())
    }
}
