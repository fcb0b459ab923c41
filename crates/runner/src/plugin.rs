//! Plugin capability interface and registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kiln_core::{Job, Phase};

use crate::context::ExecutionContext;
use crate::error::{ConfigError, TaskResult};

/// A configured capability invoked once per phase it handles.
///
/// A handler that fails because a process exited non-zero must return
/// `TaskError::ExitCode` with the code, so the engine routes the job to
/// cleanup; any other error terminates the job without cleanup.
#[async_trait]
pub trait JobPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this plugin contributes a task to the given phase.
    fn handles(&self, phase: Phase) -> bool {
        let _ = phase;
        true
    }

    async fn run(&self, ctx: &ExecutionContext) -> TaskResult<()>;
}

/// Name → plugin capability.
///
/// Jobs reference plugins by name; resolution happens at configuration
/// time so an unregistered name fails fast instead of surfacing mid-run.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn JobPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Arc<dyn JobPlugin>) {
        self.plugins.insert(plugin.name().to_string(), plugin);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn JobPlugin>, ConfigError> {
        self.plugins
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownPlugin(name.to_string()))
    }

    /// Resolve a job's configured plugins, preserving configuration order.
    pub fn resolve(&self, job: &Job) -> Result<Vec<Arc<dyn JobPlugin>>, ConfigError> {
        job.plugins.iter().map(|name| self.get(name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::{JobType, RepoSpec};

    struct Noop(&'static str);

    #[async_trait]
    impl JobPlugin for Noop {
        fn name(&self) -> &str {
            self.0
        }

        async fn run(&self, _ctx: &ExecutionContext) -> TaskResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unknown_plugin_fails_fast() {
        let registry = PluginRegistry::new();
        assert_eq!(
            registry.get("lint").err().unwrap(),
            ConfigError::UnknownPlugin("lint".to_string())
        );
    }

    #[test]
    fn test_resolve_preserves_configured_order() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(Noop("lint")));
        registry.register(Arc::new(Noop("test")));

        let job = Job::new(RepoSpec::new("acme/widgets"), JobType::TestOnly, "git")
            .with_plugins(["test", "lint"]);

        let resolved = registry.resolve(&job).unwrap();
        let names: Vec<&str> = resolved.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["test", "lint"]);
    }

    #[test]
    fn test_resolve_rejects_unknown_name() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(Noop("lint")));

        let job = Job::new(RepoSpec::new("acme/widgets"), JobType::TestOnly, "git")
            .with_plugins(["lint", "coverage"]);

        assert_eq!(
            registry.resolve(&job).err().unwrap(),
            ConfigError::UnknownPlugin("coverage".to_string())
        );
    }
}
